use chrono::NaiveDate;
use flux_demos::{
    Dataset, FluxClient, FluxError, HourOffsetRange, LngLat, Polygon, StepSpec, Variable,
    HOVER_RADIUS_KM,
};

#[tokio::main]
async fn main() -> Result<(), FluxError> {
    let client = FluxClient::new()?;
    let lake_washington = Polygon::new(vec![
        LngLat::new(-122.30, 47.50)?,
        LngLat::new(-122.20, 47.50)?,
        LngLat::new(-122.20, 47.75)?,
        LngLat::new(-122.30, 47.75)?,
    ])?;

    let result = client
        .area()
        .within(lake_washington)
        .variables(vec![Variable::PrecipitationRate])
        .time(
            NaiveDate::from_ymd_opt(2024, 11, 18)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
        .dataset(Dataset::Hrrr)
        .step(StepSpec::range(1, 6)?)
        .call()
        .await?;
    println!("{} samples", result.len());

    let offsets = HourOffsetRange::default();
    let cursor = LngLat::new(-122.25, 47.6)?;
    for hours in offsets.min..=offsets.max {
        let band = offsets.offset(hours)?.band();
        let visible = result.visible(band);
        print!("+{}h ({}..{} s): {} samples", hours, band.lower, band.upper, visible.len());
        match visible.popup_at(cursor, HOVER_RADIUS_KM) {
            Some(popup) => {
                let rows: Vec<String> = popup
                    .rows
                    .iter()
                    .map(|row| format!("{} {}", row.label, row.value))
                    .collect();
                println!(", at {}: {}", popup.title, rows.join(", "));
            }
            None => println!(", nothing near {}", cursor),
        }
    }
    Ok(())
}
