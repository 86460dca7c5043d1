fn main() -> std::process::ExitCode {
    sentiwatch_lib::run()
}
