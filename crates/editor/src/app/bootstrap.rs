use std::sync::mpsc;
use std::sync::Arc;

use engine::{
    resolve_app_paths, AppError, AssetLoader, AssetSource, EntityEngine, FsAssetSource,
    InputLayout, LoopConfig, StartupError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::editing::{self, EditorContext, GRID_PIXEL_WIDTH, TILE_SIZE_PX};
use super::tiles::{VariantTable, BASE_TILE_NAMES};

const SHOW_OUTLINES_ENV_VAR: &str = "DNGED_SHOW_OUTLINES";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) engine: EntityEngine<EditorContext>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    info!("=== Tile Editor Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        tile_asset_dir = %paths.tile_asset_dir.display(),
        "app_paths_resolved"
    );

    let source: Arc<dyn AssetSource> = Arc::new(FsAssetSource::new(&paths.tile_asset_dir));
    let loader = load_tile_assets(source)?;
    let variants = Arc::new(VariantTable::from_loader(&loader));
    let engine = editing::build_editor_engine(variants);

    let config = LoopConfig {
        window_title: "Dungeon Tile Editor".to_string(),
        input_layout: InputLayout {
            tile_size: TILE_SIZE_PX,
            grid_pixel_width: GRID_PIXEL_WIDTH,
        },
        show_outlines: parse_show_outlines_from_env(),
        ..LoopConfig::default()
    };

    Ok(AppWiring { config, engine })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Blocks until every queued tile has either loaded or failed. The engine is
/// only built once this returns.
fn load_tile_assets(source: Arc<dyn AssetSource>) -> Result<AssetLoader, StartupError> {
    let mut loader = AssetLoader::new(source);
    for name in BASE_TILE_NAMES {
        loader.queue(name)?;
    }

    let (done_tx, done_rx) = mpsc::channel();
    loader.load_all(move |summary| {
        // The receiver only disappears if startup already gave up.
        let _ = done_tx.send(summary);
    })?;
    let summary = done_rx
        .recv()
        .map_err(|_| StartupError::AssetBarrierDropped)?;
    loader.join_workers();

    if summary.failed > 0 {
        warn!(
            failed = summary.failed,
            total = summary.total,
            "tile_assets_incomplete"
        );
    }
    Ok(loader)
}

fn parse_show_outlines_from_env() -> bool {
    let Ok(raw) = std::env::var(SHOW_OUTLINES_ENV_VAR) else {
        return false;
    };
    parse_flag(&raw).unwrap_or_else(|| {
        warn!(
            var = SHOW_OUTLINES_ENV_VAR,
            value = %raw,
            "env_flag_invalid_using_default"
        );
        false
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{AssetError, Sprite};

    struct SolidTiles {
        missing: &'static [&'static str],
    }

    impl AssetSource for SolidTiles {
        fn fetch(&self, name: &str) -> Result<Sprite, AssetError> {
            if self.missing.contains(&name) {
                return Err(AssetError::Missing {
                    name: name.to_string(),
                });
            }
            Ok(Sprite::filled(32, 32, [9, 9, 9, 255]))
        }
    }

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn load_tile_assets_waits_for_every_tile() {
        let loader = load_tile_assets(Arc::new(SolidTiles { missing: &[] })).expect("loaded");

        assert!(loader.is_done());
        assert_eq!(loader.success_count(), BASE_TILE_NAMES.len());
        assert!(BASE_TILE_NAMES.iter().all(|name| loader.get(name).is_some()));
    }

    #[test]
    fn failed_tiles_do_not_block_startup() {
        let source = SolidTiles {
            missing: &["tile4.png", "tile12.png"],
        };
        let loader = load_tile_assets(Arc::new(source)).expect("loaded");

        assert_eq!(loader.error_count(), 2);
        let variants = VariantTable::from_loader(&loader);
        assert!(variants.sprite(10).is_none());
        assert!(variants.sprite(32).is_none());
        assert!(variants.sprite(1).is_some());
    }
}
