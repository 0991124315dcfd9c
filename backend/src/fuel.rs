//! Fuel and energy cost estimation for a whole trip.

use shared::DistanceUnit;

use crate::units::{from_meters, kwh_per_100km_to_per_100mi, l_per_100km_to_mpg};

/// Average consumption in L/100 km (kWh/100 km for electric), estimated
/// from vehicle class, fuel mode, and age.
pub fn average_consumption(
    vehicle_type: &str,
    fuel_type: &str,
    year: Option<i32>,
    current_year: i32,
) -> f64 {
    let mut consumption = match vehicle_type {
        "car" => 7.5,
        "suv" => 10.5,
        "truck" => 12.5,
        "van" => 11.0,
        "motorcycle" => 5.0,
        _ => 8.5,
    };

    match fuel_type {
        "diesel" => consumption *= 0.9,
        "hybrid" => consumption *= 0.65,
        "electric" => consumption = 20.0, // kWh/100 km
        _ => {}
    }

    if fuel_type != "electric" {
        if let Some(year) = year {
            let age = (current_year - year).max(0) as f64;
            consumption *= 1.0 + (age * 0.005).min(0.2);
        }
    }

    consumption
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuelEstimate {
    /// L/100 km, or kWh/100 km for electric.
    pub consumption: f64,
    /// Consumption in the traveller's display convention: mpg when the unit
    /// is miles and the vehicle burns fuel, otherwise per-100-distance.
    pub display_consumption: f64,
    pub consumption_text: String,
    pub total_cost: f64,
}

/// Trip cost over `distance_m`, priced per liter, gallon, or kWh according
/// to fuel type and display unit.
pub fn estimate_trip_cost(
    distance_m: f64,
    unit: DistanceUnit,
    vehicle_type: &str,
    fuel_type: &str,
    year: Option<i32>,
    current_year: i32,
    fuel_price: f64,
) -> FuelEstimate {
    let consumption = average_consumption(vehicle_type, fuel_type, year, current_year);
    let distance = from_meters(distance_m, unit);

    let (display_consumption, consumption_text, total_cost) = if fuel_type == "electric" {
        let rate = match unit {
            DistanceUnit::Km => consumption,
            DistanceUnit::Mi => kwh_per_100km_to_per_100mi(consumption),
        };
        let text = match unit {
            DistanceUnit::Km => format!("{rate:.1} kWh/100 km"),
            DistanceUnit::Mi => format!("{rate:.1} kWh/100 mi"),
        };
        (rate, text, distance / 100.0 * rate * fuel_price)
    } else {
        match unit {
            DistanceUnit::Km => (
                consumption,
                format!("{consumption:.1} L/100 km"),
                distance / 100.0 * consumption * fuel_price,
            ),
            DistanceUnit::Mi => {
                let mpg = l_per_100km_to_mpg(consumption);
                (mpg, format!("{mpg:.1} mpg"), distance / mpg * fuel_price)
            }
        }
    };

    FuelEstimate {
        consumption,
        display_consumption,
        consumption_text,
        total_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_consumption_by_vehicle_class() {
        assert_eq!(average_consumption("car", "gas", None, 2026), 7.5);
        assert_eq!(average_consumption("truck", "gas", None, 2026), 12.5);
        assert_eq!(average_consumption("spaceship", "gas", None, 2026), 8.5);
    }

    #[test]
    fn test_fuel_mode_adjustments() {
        assert!((average_consumption("car", "diesel", None, 2026) - 6.75).abs() < 1e-9);
        assert!((average_consumption("suv", "hybrid", None, 2026) - 6.825).abs() < 1e-9);
        assert_eq!(average_consumption("van", "electric", None, 2026), 20.0);
    }

    #[test]
    fn test_age_degradation_caps_at_twenty_percent() {
        let fresh = average_consumption("car", "gas", Some(2026), 2026);
        let old = average_consumption("car", "gas", Some(1980), 2026);
        assert_eq!(fresh, 7.5);
        assert!((old - 7.5 * 1.2).abs() < 1e-9);
        // Electric vehicles do not degrade in this model.
        assert_eq!(average_consumption("car", "electric", Some(1980), 2026), 20.0);
    }

    #[test]
    fn test_metric_gas_cost() {
        // 1000 km at 7.5 L/100 km and 1.50/L -> 112.50.
        let estimate = estimate_trip_cost(
            1_000_000.0,
            DistanceUnit::Km,
            "car",
            "gas",
            None,
            2026,
            1.50,
        );
        assert!((estimate.total_cost - 112.5).abs() < 1e-6);
        assert_eq!(estimate.consumption_text, "7.5 L/100 km");
    }

    #[test]
    fn test_miles_gas_cost_uses_mpg() {
        // ~621.4 mi at ~31.4 mpg and 4.00/gal.
        let estimate = estimate_trip_cost(
            1_000_000.0,
            DistanceUnit::Mi,
            "car",
            "gas",
            None,
            2026,
            4.00,
        );
        let miles = 1_000_000.0 / 1609.34;
        let mpg = 235.214583 / 7.5;
        assert!((estimate.total_cost - miles / mpg * 4.0).abs() < 1e-6);
        assert!(estimate.consumption_text.ends_with("mpg"));
    }

    #[test]
    fn test_electric_cost_per_kwh() {
        // 500 km at 20 kWh/100 km and 0.15/kWh -> 15.00.
        let estimate = estimate_trip_cost(
            500_000.0,
            DistanceUnit::Km,
            "car",
            "electric",
            None,
            2026,
            0.15,
        );
        assert!((estimate.total_cost - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_electric_miles_rate_converts_properly() {
        let estimate = estimate_trip_cost(
            160_934.0,
            DistanceUnit::Mi,
            "car",
            "electric",
            None,
            2026,
            0.15,
        );
        // 100 mi at 32.19 kWh/100 mi -> same energy as 160.9 km at 20 kWh/100 km.
        assert!((estimate.display_consumption - 32.1868).abs() < 1e-3);
        assert!((estimate.total_cost - 32.1868 * 0.15).abs() < 1e-2);
    }
}
