use std::process;

fn main() {
    if let Err(err) = prong_uplink::app::run() {
        eprintln!("fatal: {err:#}");
        process::exit(1);
    }
}
