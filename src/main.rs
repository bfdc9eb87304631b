fn main() {
    if let Err(err) = mtg_labels::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
