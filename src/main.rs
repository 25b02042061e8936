fn main() -> std::process::ExitCode {
    mailsmith_lib::run()
}
