use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::TempDir;
use image::{GrayImage, Luma};
use predicates::prelude::*;
use rstest::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

fn write_grey(dir: &Path, name: &str, value: u8) -> Result<()> {
    GrayImage::from_pixel(16, 16, Luma([value])).save(dir.join(name))?;
    Ok(())
}

#[fixture]
fn images() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (i, v) in [0u8, 20, 230, 250].into_iter().enumerate() {
        write_grey(dir.path(), &format!("img_{i}.png"), v).unwrap();
    }
    dir
}

#[rstest]
fn train_now_and_predict(images: TempDir) -> Result<()> {
    let work = TempDir::new()?;
    let centroids = work.path().join("model/centroids.csv");
    let labels = work.path().join("clusters");

    cargo_run!("imcluster", "train-now", "2", &centroids, images.path(), &labels).success();

    let content = fs::read_to_string(&centroids)?;
    assert_eq!(content.lines().count(), 2);
    assert!(content.lines().all(|l| l.matches(',').count() == 400));

    // 每张图片都被复制到某个聚类目录
    let copied = (0..2)
        .filter_map(|c| fs::read_dir(labels.join(c.to_string())).ok())
        .map(|d| d.count())
        .sum::<usize>();
    assert_eq!(copied, 4);

    cargo_run!("imcluster", "predict", &centroids, images.path().join("img_0.png"))
        .success()
        .stdout(predicate::str::is_match("^[01]\n$")?);

    Ok(())
}

#[rstest]
fn collect_then_train(images: TempDir) -> Result<()> {
    let work = TempDir::new()?;
    let dataset = work.path().join("training.csv");
    let centroids = work.path().join("centroids.csv");

    cargo_run!("imcluster", "collect", images.path(), &dataset).success().stdout("4\n");
    cargo_run!("imcluster", "collect", images.path(), &dataset).success().stdout("4\n");
    assert_eq!(fs::read_to_string(&dataset)?.lines().count(), 8);

    cargo_run!("imcluster", "train", "3", &dataset, &centroids).success();
    assert_eq!(fs::read_to_string(&centroids)?.lines().count(), 3);

    Ok(())
}

#[rstest]
fn batch_predict_json(images: TempDir) -> Result<()> {
    let work = TempDir::new()?;
    let centroids = work.path().join("centroids.csv");
    let sorted = work.path().join("sorted");

    cargo_run!("imcluster", "train-now", "2", &centroids, images.path()).success();
    cargo_run!(
        "imcluster",
        "batch-predict",
        "--output-format",
        "json",
        &centroids,
        images.path(),
        &sorted
    )
    .success()
    .stdout(predicate::str::contains("\"file\": \"img_0.png\""));

    assert_eq!(fs::read_dir(images.path())?.count(), 0);
    Ok(())
}

#[rstest]
#[case::directory(&["collect", "/nonexistent/imcluster", "out.csv"], 3)]
#[case::bad_argument(&["predict", "--width", "abc", "c.csv", "a.png"], 1)]
#[case::bad_mode(&["cluster-everything"], 2)]
#[case::no_mode(&[], 2)]
fn exit_codes(#[case] args: &[&str], #[case] code: i32) -> Result<()> {
    let mut cmd = Command::cargo_bin("imcluster")?;
    cmd.args(args).assert().code(code);
    Ok(())
}

#[rstest]
fn no_images_exit_code() -> Result<()> {
    let empty = TempDir::new()?;
    let work = TempDir::new()?;
    cargo_run!("imcluster", "train-now", "2", work.path().join("c.csv"), empty.path())
        .code(4)
        .stderr(predicate::str::contains("[ERR]"));
    Ok(())
}

#[rstest]
fn predict_corrupt_image_exit_code() -> Result<()> {
    let work = TempDir::new()?;
    let centroids = work.path().join("c.csv");
    fs::write(&centroids, "0.0,".repeat(400) + "\n")?;
    let image = work.path().join("broken.png");
    fs::write(&image, "garbage")?;

    cargo_run!("imcluster", "predict", &centroids, &image).code(5);
    Ok(())
}
