fn main() -> std::process::ExitCode {
    recetas_admin_lib::run()
}
