fn main() {
    if let Err(err) = elbow_router::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
