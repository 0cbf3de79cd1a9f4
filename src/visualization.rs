use crate::chart::Chart;
use opencv::{
    core::{self, Point, Rect, Scalar},
    highgui, imgcodecs, imgproc,
    prelude::*,
};
use std::path::Path;

const BLACK: Scalar = Scalar::new(0.0, 0.0, 0.0, 0.0);
const GRID: Scalar = Scalar::new(220.0, 220.0, 220.0, 0.0);
const STEM: Scalar = Scalar::new(180.0, 119.0, 31.0, 0.0); // BGR blue
const MEAN: Scalar = Scalar::new(40.0, 39.0, 214.0, 0.0); // BGR red

const FONT: i32 = imgproc::FONT_HERSHEY_SIMPLEX;

/// Space reserved around the plot area: left, top, right, bottom.
const MARGINS: (i32, i32, i32, i32) = (90, 60, 30, 110);

/// Draw text on an image with specified font size and color
pub fn draw_text(
    frame: &mut Mat,
    text: &str,
    x: i32,
    y: i32,
    font_scale: f64,
    color: Scalar,
) -> opencv::Result<()> {
    imgproc::put_text(
        frame,
        text,
        Point::new(x, y),
        FONT,
        font_scale,
        color,
        1,
        imgproc::LINE_AA,
        false,
    )
}

fn text_width(text: &str, font_scale: f64) -> opencv::Result<i32> {
    let mut baseline = 0;
    let size = imgproc::get_text_size(text, FONT, font_scale, 1, &mut baseline)?;
    Ok(size.width)
}

/// Text centered horizontally on `x`.
fn draw_centered(
    frame: &mut Mat,
    text: &str,
    x: i32,
    y: i32,
    font_scale: f64,
) -> opencv::Result<()> {
    let width = text_width(text, font_scale)?;
    draw_text(frame, text, x - width / 2, y, font_scale, BLACK)
}

/// Stack the characters of `text` top to bottom, for steep tick rotations.
fn draw_vertical(
    frame: &mut Mat,
    text: &str,
    x: i32,
    y: i32,
    font_scale: f64,
) -> opencv::Result<()> {
    let step = (22.0 * font_scale).ceil() as i32;
    for (i, c) in text.chars().enumerate() {
        draw_centered(frame, &c.to_string(), x, y + i as i32 * step, font_scale)?;
    }
    Ok(())
}

fn line(
    frame: &mut Mat,
    from: Point,
    to: Point,
    color: Scalar,
    thickness: i32,
) -> opencv::Result<()> {
    imgproc::line(frame, from, to, color, thickness, imgproc::LINE_AA, 0)
}

fn dashed_line(frame: &mut Mat, from: Point, to: Point, color: Scalar) -> opencv::Result<()> {
    const DASH: i32 = 8;
    let mut x = from.x;
    while x < to.x {
        let end = (x + DASH).min(to.x);
        line(frame, Point::new(x, from.y), Point::new(end, to.y), color, 2)?;
        x += DASH * 2;
    }
    Ok(())
}

/// Maps chart coordinates to pixels inside the plot area.
struct Axes {
    area: Rect,
    count: usize,
    pad: f64,
    low: f64,
    high: f64,
}

impl Axes {
    fn new(chart: &Chart, area: Rect) -> Self {
        let count = chart.points.len();
        let span = count.saturating_sub(1) as f64;
        let (mut low, mut high) = chart.value_range();
        if high - low <= f64::EPSILON {
            low -= 1.0;
            high += 1.0;
        }
        let headroom = (high - low) * 0.05;
        Self {
            area,
            count,
            pad: (span * chart.x_margin).max(0.5),
            low: low - headroom,
            high: high + headroom,
        }
    }

    fn x(&self, index: usize) -> i32 {
        let span = self.count.saturating_sub(1) as f64 + 2.0 * self.pad;
        let t = (index as f64 + self.pad) / span;
        self.area.x + (t * self.area.width as f64).round() as i32
    }

    fn y(&self, value: f64) -> i32 {
        let t = (value - self.low) / (self.high - self.low);
        self.area.y + self.area.height - (t * self.area.height as f64).round() as i32
    }

    fn left(&self) -> i32 {
        self.area.x
    }

    fn right(&self) -> i32 {
        self.area.x + self.area.width
    }

    fn bottom(&self) -> i32 {
        self.area.y + self.area.height
    }
}

/// Render a chart as a stem plot.
pub fn render_chart(chart: &Chart, width: i32, height: i32) -> opencv::Result<Mat> {
    let mut img =
        Mat::new_rows_cols_with_default(height, width, core::CV_8UC3, Scalar::all(255.0))?;
    let (left, top, right, bottom) = MARGINS;
    let area = Rect::new(left, top, width - left - right, height - top - bottom);
    let axes = Axes::new(chart, area);

    // Horizontal grid with value ticks
    for i in 0..=4 {
        let value = axes.low + (axes.high - axes.low) * i as f64 / 4.0;
        let y = axes.y(value);
        line(&mut img, Point::new(axes.left(), y), Point::new(axes.right(), y), GRID, 1)?;
        let label = format!("{:.2}", value);
        let w = text_width(&label, 0.4)?;
        draw_text(&mut img, &label, axes.left() - w - 6, y + 4, 0.4, BLACK)?;
    }

    let zero = axes.y(0.0);
    line(&mut img, Point::new(axes.left(), zero), Point::new(axes.right(), zero), BLACK, 1)?;

    let step = chart.x_tick_step.unwrap_or(1).max(1);
    let vertical_ticks = chart.tick_rotation.abs() >= 45.0;
    for (i, (label, value)) in chart.points().enumerate() {
        let x = axes.x(i);
        let y = axes.y(value);
        line(&mut img, Point::new(x, zero), Point::new(x, y), STEM, 1)?;
        imgproc::circle(&mut img, Point::new(x, y), 3, STEM, -1, imgproc::LINE_AA, 0)?;

        let frame_number = i + 1;
        if chart.x_tick_step.is_none() || frame_number % step == 0 || i == 0 {
            let tick_top = axes.bottom();
            line(&mut img, Point::new(x, tick_top), Point::new(x, tick_top + 4), BLACK, 1)?;
            if vertical_ticks {
                draw_vertical(&mut img, label, x, tick_top + 16, 0.35)?;
            } else {
                draw_centered(&mut img, label, x, tick_top + 18, 0.4)?;
            }
        }
    }

    if let Some(reference) = chart.reference {
        let y = axes.y(reference);
        dashed_line(&mut img, Point::new(axes.left(), y), Point::new(axes.right(), y), MEAN)?;
        let text = format!("mean {:+.4}", reference);
        let w = text_width(&text, 0.45)?;
        draw_text(&mut img, &text, axes.right() - w, y - 6, 0.45, MEAN)?;
    }

    imgproc::rectangle(&mut img, area, BLACK, 1, imgproc::LINE_8, 0)?;

    draw_centered(&mut img, &chart.title, width / 2, top / 2, 0.6)?;
    draw_text(&mut img, &chart.y_label, 8, top - 12, 0.45, BLACK)?;
    draw_centered(&mut img, &chart.x_label, area.x + area.width / 2, height - 12, 0.5)?;

    // Legend
    let legend = Point::new(area.x + 10, area.y + 18);
    imgproc::circle(
        &mut img,
        Point::new(legend.x, legend.y - 4),
        3,
        STEM,
        -1,
        imgproc::LINE_AA,
        0,
    )?;
    draw_text(&mut img, &chart.series_label, legend.x + 10, legend.y, 0.45, STEM)?;

    Ok(img)
}

/// Stack several charts vertically into one image.
pub fn render_charts(charts: &[Chart], width: i32, chart_height: i32) -> opencv::Result<Mat> {
    let mut rendered = core::Vector::<Mat>::new();
    for chart in charts {
        rendered.push(render_chart(chart, width, chart_height)?);
    }
    let mut img = Mat::default();
    core::vconcat(&rendered, &mut img)?;
    Ok(img)
}

/// Write an image; the encoder reporting failure is an error too.
pub fn save<P: AsRef<Path>>(img: &Mat, path: P) -> opencv::Result<()> {
    let path = path.as_ref().to_string_lossy();
    if !imgcodecs::imwrite(&path, img, &core::Vector::new())? {
        return Err(opencv::Error::new(
            core::StsError,
            format!("failed to write image {}", path),
        ));
    }
    Ok(())
}

/// Show an image in a window until a key is pressed.
pub fn show(img: &Mat, window_name: &str) -> opencv::Result<()> {
    highgui::named_window(window_name, highgui::WINDOW_AUTOSIZE)?;
    highgui::imshow(window_name, img)?;
    highgui::wait_key(0)?;
    highgui::destroy_window(window_name)?;
    Ok(())
}
