use leapoch::{format_scaled, format_utc, LeapSecondTable, Moment, SiUnit, TimeScale};

fn main() -> Result<(), leapoch::TimeError> {
    let ls = LeapSecondTable::standard();

    // One second before the 2012-06-30 leap second, plus one SI second.
    let before = Moment::of(1_278_028_823, 0, TimeScale::Utc, &ls)?;
    let leap = before.plus(1, SiUnit::Seconds, &ls)?;

    println!("UTC:   {}", format_utc(&leap, &ls));
    for scale in [TimeScale::Posix, TimeScale::Tai, TimeScale::Gps] {
        println!("{}: {}", scale, format_scaled(&leap, scale, &ls)?);
    }
    println!("leap second: {}", leap.is_leap_second(&ls));

    let now = leapoch::now()?;
    println!("now:   {}", format_utc(&now, &ls));
    Ok(())
}
