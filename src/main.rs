fn main() -> anyhow::Result<()> {
    tunedeck::init_tracing()?;
    tunedeck::app_core::TuneDeck::new()?.run()?;
    Ok(())
}
