use detexport::{BatchDriver, BoundingBox, ClassNames, Detection, ExportFlags, ScriptedDetector};
use image::{Rgb, RgbImage};

fn main() -> anyhow::Result<()> {
    let workspace = tempfile::TempDir::new()?;
    let images_dir = workspace.path().join("images");
    std::fs::create_dir(&images_dir)?;

    // Two gradient images
    for name in ["street.jpg", "yard.png"] {
        let mut img = RgbImage::new(320, 240);
        for y in 0..240 {
            for x in 0..320 {
                img.put_pixel(x, y, Rgb([(x * 255 / 320) as u8, (y * 255 / 240) as u8, 128]));
            }
        }
        img.save(images_dir.join(name))?;
    }

    // Stand-in for a real model: one image with two hits, one with none
    let mut detector = ScriptedDetector::new()
        .with_names(ClassNames::new(vec!["person".into(), "car".into()]))
        .then_detect(vec![
            Detection::new(1, 0.91, BoundingBox::new(40.0, 60.0, 200.0, 180.0)),
            Detection::new(0, 0.47, BoundingBox::new(220.0, 30.0, 300.0, 230.0)),
        ])
        .then_detect(vec![]);

    let summary = BatchDriver::new(&images_dir)
        .with_flags(ExportFlags::all())
        .run(&mut detector)?;

    println!("{}", summary);
    println!("\nLedger:\n{}", std::fs::read_to_string(&summary.ledger_path)?);

    Ok(())
}
