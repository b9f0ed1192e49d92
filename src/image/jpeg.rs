//! JPEG decoding of webcam frames.

use anyhow::bail;
use image::ImageBuffer;
use zune_jpeg::zune_core::colorspace::ColorSpace;
use zune_jpeg::zune_core::options::DecoderOptions;

use super::Image;

pub(super) fn decode_jpeg(data: &[u8]) -> anyhow::Result<Image> {
    let mut decomp = zune_jpeg::JpegDecoder::new_with_options(
        DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGBA),
        data,
    );
    decomp.decode_headers()?;
    let colorspace = decomp.get_output_colorspace().unwrap();
    if colorspace != ColorSpace::RGBA {
        bail!("unsupported colorspace {colorspace:?} (expected RGBA)");
    }

    let mut buf = vec![0; decomp.output_buffer_size().unwrap()];
    decomp.decode_into(&mut buf)?;
    let (width, height) = decomp.dimensions().unwrap();
    let buf = ImageBuffer::from_raw(width.into(), height.into(), buf)
        .expect("failed to create ImageBuffer");

    Ok(Image { buf })
}
