use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyleBuilder},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyleBuilder, Rectangle},
    text::{Baseline, Text},
};

pub fn draw_line<D>(
    target: &mut D,
    start: Point,
    end: Point,
    color: Rgb888,
    width: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    Line::new(start, end)
        .into_styled(PrimitiveStyleBuilder::new().stroke_width(width).stroke_color(color).build())
        .draw(target)
        .map_err(|e| D::Error::from(e))?;
    Ok(())
}

pub fn fill_rectangle<D>(target: &mut D, region: Rectangle, color: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    region
        .into_styled(PrimitiveStyleBuilder::new().fill_color(color).build())
        .draw(target)
        .map_err(|e| D::Error::from(e))?;
    Ok(())
}

/// Filled dot centered on `center`.
pub fn draw_dot<D>(target: &mut D, center: Point, radius: u32, color: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    Circle::with_center(center, radius * 2)
        .into_styled(PrimitiveStyleBuilder::new().fill_color(color).build())
        .draw(target)
        .map_err(|e| D::Error::from(e))?;
    Ok(())
}

pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    x: i32,
    y: i32,
    font: &MonoFont,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    Text::with_baseline(
        text,
        Point::new(x, y),
        MonoTextStyleBuilder::new()
            .font(font)
            .text_color(color)
            .build(),
        Baseline::Top,
    )
    .draw(target)
    .map_err(|e| D::Error::from(e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn test_draw_text_clips_silently() {
        let mut c = Canvas::new(16, 16, WHITE);
        let font = crate::fonts::font_for_px(13);
        // Way past the right edge; must not error, must not wrap back.
        draw_text(&mut c, "overflow", 12, 2, font, BLACK).unwrap();
        for y in 0..16 {
            assert_eq!(c.pixel(0, y), Some(WHITE));
        }
    }

    #[test]
    fn test_fill_rectangle() {
        let mut c = Canvas::new(8, 8, WHITE);
        fill_rectangle(&mut c, Rectangle::new(Point::new(2, 2), Size::new(3, 3)), BLACK).unwrap();
        assert_eq!(c.pixel(2, 2), Some(BLACK));
        assert_eq!(c.pixel(4, 4), Some(BLACK));
        assert_eq!(c.pixel(5, 5), Some(WHITE));
    }
}
