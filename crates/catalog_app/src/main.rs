mod platform;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    platform::run_app(config_path.as_deref())
}
