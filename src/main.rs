fn main() -> std::process::ExitCode {
    twinpane_lib::run()
}
