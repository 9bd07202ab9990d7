mod infra;
mod opcua_server;
mod runtime;

fn main() {
    if let Err(err) = runtime::run_from_args() {
        eprintln!("opcsim: {err}");
        std::process::exit(1);
    }
}
