fn main() {
    if let Err(err) = chargepoint_etl::app::run() {
        eprintln!("import failed: {err}");
        std::process::exit(1);
    }
}
