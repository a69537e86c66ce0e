use crate::common_types::{Density, PdfPrintSize};
use crate::errors::AppError;
use crate::AppResult;

const PRINT_SIZE_LABEL: &str = "print size:";

/// Extracts the page print size from the rasterizer's metadata output.
///
/// The `Print size:` line is preferred; without one, the first `WxH` token in the
/// whole output is used.
pub fn parse_print_size(metadata: &str) -> AppResult<PdfPrintSize> {
    let print_size_line = metadata.lines().find_map(|line| {
        let lowercase = line.to_lowercase();
        lowercase
            .find(PRINT_SIZE_LABEL)
            .map(|idx| lowercase[idx + PRINT_SIZE_LABEL.len()..].to_string())
    });

    let parsed = match print_size_line {
        Some(ref line) => line.split_whitespace().find_map(parse_dimensions_token),
        None => metadata.split_whitespace().find_map(parse_dimensions_token),
    };

    parsed.ok_or_else(|| {
        AppError::invalid_input(format!(
            "No WIDTHxHEIGHT print size found in tool output: {:?}",
            metadata.trim()
        ))
    })
}

fn parse_dimensions_token(token: &str) -> Option<PdfPrintSize> {
    let (width, height) = token.split_once(['x', 'X'])?;
    let width = width.trim().parse::<f64>().ok()?;
    let height = height.trim().parse::<f64>().ok()?;
    if width.is_finite() && height.is_finite() {
        Some(PdfPrintSize { width, height })
    } else {
        None
    }
}

/// Smallest density at which the largest page dimension reaches `max_width` pixels.
pub fn resolve_density(print_size: &PdfPrintSize, max_width: u32) -> AppResult<Density> {
    let largest = print_size.largest_dimension();
    if !largest.is_finite() || largest <= 0.0 {
        return Err(AppError::invalid_input(format!(
            "Print size {}x{} has no usable dimension",
            print_size.width, print_size.height
        )));
    }

    let target = max_width as f64;
    let quotient = (target / largest).ceil().max(1.0);
    if quotient >= u32::MAX as f64 {
        return Err(AppError::invalid_input(format!(
            "Print size {}x{} is too small to render at {} px",
            print_size.width, print_size.height, max_width
        )));
    }
    let mut density = quotient as u64;
    // Float division can land one step off when the quotient is close to an integer.
    while density > 1 && (density - 1) as f64 * largest >= target {
        density -= 1;
    }
    while (density as f64) * largest < target {
        density += 1;
    }

    u32::try_from(density)
        .map(Density::from)
        .map_err(|_| AppError::invalid_input(format!("Density {density} is out of range")))
}
