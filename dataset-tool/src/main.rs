use anyhow::{ensure, Context, Result};
use bbox::{prelude::*, CyCxHW, Pixel, Ratio, RatioCyCxHW};
use clap::Parser;
use detection_dataset::{
    render::{corner_box, render_boxes},
    DatasetConfig, DetectionDataset,
};
use image::GenericImageView as _;
use prettytable::{cell, row, Table};
use std::{
    env,
    path::{Path, PathBuf},
};
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
/// Inspect object detection datasets
enum Opts {
    /// Print the first box of every example
    Info {
        /// configuration file
        config_file: PathBuf,
    },
    /// Draw the boxes of one example onto a copy of its image
    Render {
        /// configuration file
        config_file: PathBuf,
        /// example index
        index: usize,
        /// output image file
        output_file: PathBuf,
        /// predicted box as normalized x_center, y_center, width, height
        #[clap(long, number_of_values = 4, allow_hyphen_values = true)]
        prediction: Option<Vec<f64>>,
    },
}

fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    match Opts::parse() {
        Opts::Info { config_file } => {
            info(config_file)?;
        }
        Opts::Render {
            config_file,
            index,
            output_file,
            prediction,
        } => {
            render(config_file, index, output_file, prediction)?;
        }
    }

    Ok(())
}

fn open_dataset(config_file: &Path) -> Result<DetectionDataset> {
    let config = DatasetConfig::open(config_file)?;
    // relative directories are taken from the config file location
    let config = match config_file.parent() {
        Some(dir) => config.relative_to(dir),
        None => config,
    };
    let dataset = DetectionDataset::from_config(&config)
        .with_context(|| format!("failed to load dataset from '{}'", config_file.display()))?;
    info!("loaded {} examples", dataset.len());
    Ok(dataset)
}

fn info(config_file: impl AsRef<Path>) -> Result<()> {
    let dataset = open_dataset(config_file.as_ref())?;
    let index = dataset.index();

    let mut table = Table::new();
    table.add_row(row!["index", "image", "annotation", "x", "y", "w", "h"]);

    let mut num_errors = 0;
    (0..dataset.len()).for_each(|nth| {
        let image_name = file_name(index.image_file(nth));
        let annotation_name = file_name(index.annotation_file(nth));

        match dataset.get(nth) {
            Ok(example) => {
                let [x, y, w, h] = example.xywh();
                table.add_row(row![
                    nth,
                    image_name,
                    annotation_name,
                    format!("{:.4}", x),
                    format!("{:.4}", y),
                    format!("{:.4}", w),
                    format!("{:.4}", h),
                ]);
            }
            Err(err) => {
                num_errors += 1;
                warn!("{:#}", anyhow::Error::from(err));
                table.add_row(row![nth, image_name, annotation_name, "-", "-", "-", "-"]);
            }
        }
    });

    table.printstd();

    if num_errors > 0 {
        warn!("{} of {} examples failed to load", num_errors, dataset.len());
    }

    Ok(())
}

fn render(
    config_file: impl AsRef<Path>,
    index: usize,
    output_file: impl AsRef<Path>,
    prediction: Option<Vec<f64>>,
) -> Result<()> {
    let output_file = output_file.as_ref();
    let dataset = open_dataset(config_file.as_ref())?;
    let example = dataset.get(index)?;

    let prediction = prediction.map(|xywh| parse_xywh(&xywh)).transpose()?;
    let canvas = render_boxes(&example.image, &example.bbox, prediction.as_ref())?;
    canvas
        .save(output_file)
        .with_context(|| format!("failed to write '{}'", output_file.display()))?;
    info!("saved '{}'", output_file.display());

    if let Some(prediction) = &prediction {
        let (width, height) = example.image.dimensions();
        let Pixel(gt) = corner_box(&example.bbox, width, height)?;
        let Pixel(pred) = corner_box(prediction, width, height)?;
        info!("IoU between ground truth and prediction: {:.4}", gt.iou_with(&pred, 1e-9));
    }

    Ok(())
}

fn parse_xywh(values: &[f64]) -> Result<RatioCyCxHW<f64>> {
    ensure!(
        values.len() == 4,
        "expect 4 box values, but get {}",
        values.len()
    );
    let [x, y, w, h] = [values[0], values[1], values[2], values[3]];
    let cycxhw = CyCxHW::try_from_cycxhw([y, x, h, w])?;
    Ok(Ratio(cycxhw))
}

fn file_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<missing>".to_string())
}
