fn main() {
    if let Err(err) = formsense::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
