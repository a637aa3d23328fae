fn main() {
    if let Err(e) = bsonjson::cli::run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
