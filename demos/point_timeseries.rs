use chrono::NaiveDate;
use flux_demos::{FluxClient, FluxError, LngLat, Variable};

#[tokio::main]
async fn main() -> Result<(), FluxError> {
    let client = FluxClient::new()?;
    let series = client
        .position()
        .at(LngLat::new(-74.5, 40.0)?)
        .variable(Variable::Temperature2m)
        .time(NaiveDate::from_ymd_opt(2024, 11, 4).unwrap())
        .call()
        .await?;

    println!(
        "{} at {}, run {}",
        series.variable().label(),
        series.location(),
        series.reference_time()
    );
    for point in series.chart_points().iter().take(12) {
        match point.value {
            Some(value) => println!("{:>14}  {:.1}{}", point.tooltip_label, value, series.variable().display_unit()),
            None => println!("{:>14}  N/A", point.tooltip_label),
        }
    }

    let frame = series.to_frame()?.frame.collect()?;
    println!("{}", frame.head(Some(5)));
    Ok(())
}
