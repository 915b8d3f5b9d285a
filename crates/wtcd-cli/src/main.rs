fn main() {
    wtcd_cli::init_tracing();
    let code = wtcd_cli::run_cli_from_args(std::env::args_os());
    std::process::exit(code);
}
