//! Confirmation voucher rendering.
//!
//! The confirmation screen shows the booking reference as a QR code so the
//! operator can pull the booking up at pickup. The code is rendered to an
//! inline PNG data URI; no files are written.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma};
use qrcode::{Color, QrCode};

use crate::error::AppError;

const MODULE_PIXELS: u32 = 8;
const QUIET_ZONE_MODULES: u32 = 4;

/// Render a booking reference as a QR code PNG, returned as a
/// `data:image/png;base64,...` URI.
pub fn reference_qr_data_uri(reference: &str) -> Result<String, AppError> {
    let code = QrCode::new(reference.as_bytes())
        .map_err(|e| AppError::Internal(format!("QR encoding failed: {e}")))?;

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let size = (modules + 2 * QUIET_ZONE_MODULES) * MODULE_PIXELS;

    // White canvas with a quiet zone, dark modules painted over it
    let mut canvas = GrayImage::from_pixel(size, size, Luma([255]));
    for (index, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let module_x = (index as u32 % modules + QUIET_ZONE_MODULES) * MODULE_PIXELS;
        let module_y = (index as u32 / modules + QUIET_ZONE_MODULES) * MODULE_PIXELS;
        for dy in 0..MODULE_PIXELS {
            for dx in 0..MODULE_PIXELS {
                canvas.put_pixel(module_x + dx, module_y + dy, Luma([0]));
            }
        }
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(canvas.as_raw(), size, size, ExtendedColorType::L8)
        .map_err(|e| AppError::Internal(format!("QR rendering failed: {e}")))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}
