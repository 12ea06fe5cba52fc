fn main() -> anyhow::Result<()> {
    vocab_cli::run()
}
