//! Shared fixtures for integration tests.

#![allow(dead_code)]

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Flat gray PNG; its quality score is `0.2 * level` plus a tiny resolution term
pub fn write_gray_png(path: &Path, level: u8) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = ImageBuffer::from_fn(32, 32, |_, _| Luma([level]));
    DynamicImage::ImageLuma8(img).save(path).unwrap();
}

/// JPEG-encoded gradient
pub fn jpeg_bytes(seed: u8) -> Vec<u8> {
    let img = ImageBuffer::from_fn(48, 32, |x, y| {
        Luma([(x as u8).wrapping_mul(5).wrapping_add(seed) ^ (y as u8)])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

fn dms(d: u32, m: u32, s_num: u32, s_denom: u32) -> Value {
    Value::Rational(vec![
        Rational { num: d, denom: 1 },
        Rational { num: m, denom: 1 },
        Rational {
            num: s_num,
            denom: s_denom,
        },
    ])
}

/// EXIF values to embed in a test JPEG
#[derive(Default)]
pub struct ExifSpec<'a> {
    pub date_time_original: Option<&'a str>,
    pub date_time_digitized: Option<&'a str>,
    /// IFD0 `DateTime`, the last-modified stamp
    pub date_time: Option<&'a str>,
    /// Central London, 51°30'26.46"N 0°7'39.936"W
    pub london_gps: bool,
    /// Write London's latitude without any longitude
    pub latitude_only: bool,
}

/// Serialize `spec` as a TIFF-structured EXIF block
pub fn exif_block(spec: &ExifSpec<'_>) -> Vec<u8> {
    let mut fields = Vec::new();
    let dates = [
        (Tag::DateTimeOriginal, spec.date_time_original),
        (Tag::DateTimeDigitized, spec.date_time_digitized),
        (Tag::DateTime, spec.date_time),
    ];
    for (tag, value) in dates {
        if let Some(dt) = value {
            fields.push(Field {
                tag,
                ifd_num: In::PRIMARY,
                value: ascii(dt),
            });
        }
    }
    if spec.london_gps || spec.latitude_only {
        fields.push(Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii("N"),
        });
        fields.push(Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: dms(51, 30, 2646, 100),
        });
    }
    if spec.london_gps {
        fields.push(Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii("W"),
        });
        fields.push(Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: dms(0, 7, 39936, 1000),
        });
    }

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut out = Cursor::new(Vec::new());
    writer.write(&mut out, false).unwrap();
    out.into_inner()
}

/// Insert an APP1 Exif segment right after the JPEG SOI marker
pub fn with_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let segment_len = (2 + 6 + tiff.len()) as u16;

    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Write a JPEG carrying the given EXIF values
pub fn write_exif_jpeg(path: &Path, seed: u8, spec: &ExifSpec<'_>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, with_exif(&jpeg_bytes(seed), &exif_block(spec))).unwrap();
}

/// File names directly inside `dir`, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
