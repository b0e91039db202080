use log::LevelFilter;

/// RUST_LOG 환경 변수를 읽은 뒤 `level`로 덮어씀
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
