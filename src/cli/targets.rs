use std::process;

use polyemit::codegen::{create_backend, TARGETS};

pub fn cmd_targets() {
    for name in TARGETS {
        match create_backend(name) {
            Ok(backend) => println!("{:<4} .{}", backend.target_name(), backend.output_extension()),
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
    }
}
