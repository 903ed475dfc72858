use chrono::{TimeZone, Utc};
use flux_demos::{groups, resolve, FluxClient, FluxError, StepSpec};

fn main() -> Result<(), FluxError> {
    for group in groups() {
        println!("{}", group.label);
        for view in group.views {
            let camera = view.camera();
            println!(
                "  {:<36} {:<28} center {} zoom {}",
                view.title(),
                view.path(),
                camera.center,
                camera.zoom
            );
        }
    }

    let globe = resolve("/wms/gfs-globe");
    println!("\n/wms/gfs-globe -> {:?}", globe);

    let client = FluxClient::new()?;
    let template = client
        .wms_tiles()
        .layer("gust")
        .time(Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap())
        .color_scale((0.0, 40.0))
        .step(StepSpec::Hours(1))
        .call()?;
    println!("{}", template.template());
    println!("{}", template.tile_url(1, 1, 2)?);
    Ok(())
}
