use image::{ImageBuffer, Rgba as Pixel};
use rotated_text::{
    AutoFitRotatedTextRenderer, FontdueShaper, RasterSurface, Rgba, RotatedTextView,
};

#[allow(clippy::unwrap_used)]
fn main() {
    let shaper = FontdueShaper::with_system_fonts();
    if shaper.font_storage().lock().is_empty() {
        println!("No system fonts found; nothing to render.");
        return;
    }
    let mut renderer = AutoFitRotatedTextRenderer::new(shaper);

    let mut view = RotatedTextView::new();
    view.set_text_color(Rgba::from_argb(0xFF00_0000));
    view.set_text("Hello, World!");
    view.set_text_size(100.0);

    std::fs::create_dir_all("debug").expect("failed to create debug directory");

    for (right_to_left, name) in [(false, "rotated_text_ltr"), (true, "rotated_text_rtl")] {
        view.set_right_to_left(right_to_left);
        let (width, height) = view.measure(300, 800);

        let mut canvas = RasterSurface::new(width, height);
        canvas.fill(Rgba::WHITE);

        let timer = std::time::Instant::now();
        view.draw(&mut renderer, &mut canvas).unwrap();
        let elapsed = timer.elapsed();

        let request = view.render_request(renderer.shaper()).unwrap();
        let fitted = renderer.fit(&request).unwrap();
        println!(
            "{name}: {width}x{height}, size {} -> {} ({} lines, elapsed: {:.2?})",
            request.start_font_size,
            fitted.font_size,
            fitted.lines().len(),
            elapsed
        );

        let img: ImageBuffer<Pixel<u8>, Vec<u8>> =
            ImageBuffer::from_raw(width, height, canvas.into_bytes())
                .expect("canvas dimensions must match pixel buffer length");

        let path = format!("debug/{name}.png");
        img.save(&path).expect("failed to save debug image");
        println!("Saved {path}");
    }
}
