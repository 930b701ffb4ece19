use std::process;

fn main() {
    if let Err(err) = csvstage::run() {
        eprintln!("error: {err}");
        process::exit(err.exit_code());
    }
}
