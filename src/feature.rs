use std::ops::Deref;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader};

use crate::config::{Channels, FeatureConfig};
use crate::error::{Error, Result};

/// 缩放使用的插值方式
const FILTER: FilterType = FilterType::CatmullRom;

/// 图片缩放后展开得到的定长向量，按行优先、通道交错排列
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn from_pixels(pixels: &[u8], normalize: bool) -> Self {
        let values = pixels
            .iter()
            .map(|&p| if normalize { p as f32 / 255.0 } else { p as f32 })
            .collect();
        Self(values)
    }
}

impl Deref for FeatureVector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

/// 解码图片，转换到指定的通道格式，并缩放到 `width × height`
///
/// 返回的像素数量总是 `width * height * channels`
pub fn decode_and_resize(
    path: &Path,
    width: u32,
    height: u32,
    channels: Channels,
) -> Result<Vec<u8>> {
    let decode_err = |source: image::ImageError| Error::Decode { path: path.to_path_buf(), source };
    let image = ImageReader::open(path)
        .map_err(|e| decode_err(e.into()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.into()))?
        .decode()
        .map_err(decode_err)?;

    if width == 0 || height == 0 {
        return Err(Error::Resize {
            path: path.to_path_buf(),
            reason: format!("目标尺寸 {width}x{height} 无效"),
        });
    }

    let pixels = resize_raw(&image, width, height, channels);
    let expected = width as usize * height as usize * channels.count();
    if pixels.len() != expected {
        return Err(Error::Resize {
            path: path.to_path_buf(),
            reason: format!("缩放结果长度 {} 与期望 {} 不一致", pixels.len(), expected),
        });
    }
    Ok(pixels)
}

fn resize_raw(image: &DynamicImage, width: u32, height: u32, channels: Channels) -> Vec<u8> {
    match channels {
        Channels::Grey => imageops::resize(&image.to_luma8(), width, height, FILTER).into_raw(),
        Channels::GreyAlpha => {
            imageops::resize(&image.to_luma_alpha8(), width, height, FILTER).into_raw()
        }
        Channels::Rgb => imageops::resize(&image.to_rgb8(), width, height, FILTER).into_raw(),
        Channels::Rgba => imageops::resize(&image.to_rgba8(), width, height, FILTER).into_raw(),
    }
}

/// 将一张图片转换为特征向量
pub fn build(path: &Path, config: &FeatureConfig) -> Result<FeatureVector> {
    let pixels = decode_and_resize(path, config.width, config.height, config.channels)?;
    Ok(FeatureVector::from_pixels(&pixels, config.normalize))
}
