fn main() {
    if let Err(err) = vizscore::run() {
        eprintln!("{}", vizscore::format_error(&err));
        std::process::exit(1);
    }
}
