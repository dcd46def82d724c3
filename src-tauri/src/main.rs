// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use keyrotator_lib::cli;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    match cli::parse_args(&args) {
        Some(Ok(command)) => {
            if let Err(e) = cli::run(command) {
                eprintln!("[keyrotator] {}", e);
                std::process::exit(1);
            }
        }
        Some(Err(usage)) => {
            eprintln!("{}", usage);
            std::process::exit(2);
        }
        None => {
            // Create an ambient Tokio runtime and hand it to Tauri so the
            // display clock and async IPC share one set of worker threads.
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime");
            tauri::async_runtime::set(rt.handle().clone());

            // Default: launch Tauri desktop app
            keyrotator_lib::run();
        }
    }
}
