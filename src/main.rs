fn main() -> anyhow::Result<()> {
    json_sift::cli::CommandLineInterface::load().run()
}
