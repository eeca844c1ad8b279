fn main() -> std::process::ExitCode {
    launcher::native::run()
}
