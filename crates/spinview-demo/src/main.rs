mod cube;

use anyhow::Result;
use spinview_engine::device::GpuInit;
use spinview_engine::logging::{init_logging, LoggingConfig};
use spinview_engine::view::{DepthFormat, DepthMode, ViewConfig};
use spinview_engine::window::{Runtime, RuntimeConfig};

use cube::CubeApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "spinview".to_string(),
        view: ViewConfig {
            depth: DepthMode::Enabled(DepthFormat::Depth24Plus),
            ..ViewConfig::default()
        },
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), CubeApp::default())
}
