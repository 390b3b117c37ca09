//! Scenario setup: populate a store with a realistic small-town fleet.
//!
//! Names, places, and plates mimic the Supatá town the system dispatches
//! for. With a fixed seed the generated population is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocator::{self, AllocatorConfig, TripRequest};
use crate::clock::SystemClock;
use crate::entities::{DriverId, RiderId, TripId, VehicleId};
use crate::error::DispatchError;
use crate::store::MemoryStore;

const RIDER_NAMES: [&str; 12] = [
    "Carlos Rodríguez",
    "María González",
    "Juan Martínez",
    "Ana Ramírez",
    "Pedro Sánchez",
    "Laura Torres",
    "Camila López",
    "Diego Hernández",
    "Valentina Díaz",
    "Andrés Castro",
    "Sofía Vargas",
    "Mariana Rojas",
];

const DRIVER_NAMES: [&str; 10] = [
    "Roberto Pérez",
    "Fernando Gómez",
    "Alberto Silva",
    "Héctor Mendoza",
    "Ricardo Parra",
    "Jorge Mario Cruz",
    "Gustavo León",
    "Javier Suárez",
    "Wilson Cortés",
    "Iván Salazar",
];

const ORIGINS: [&str; 8] = [
    "Plaza Principal",
    "Hospital San Rafael",
    "Colegio Departamental",
    "Parque Municipal",
    "Terminal de Transporte",
    "Mercado Municipal",
    "Vereda San José",
    "Vereda La Palma",
];

const DESTINATIONS: [&str; 8] = [
    "La Vega",
    "San Francisco",
    "Villeta",
    "Sasaima",
    "Útica",
    "Bogotá",
    "Vereda El Tablazo",
    "Alto del Zorro",
];

/// Destinations close enough for the mid price band.
const NEARBY_TOWNS: [&str; 5] = ["La Vega", "San Francisco", "Villeta", "Sasaima", "Útica"];

const VEHICLE_MODELS: [&str; 6] = [
    "Bajaj RE 2022",
    "Bajaj Qute 2023",
    "Piaggio Ape City 2022",
    "TVS King 2023",
    "Mahindra Alfa 2023",
    "Atul Auto Shakti 2022",
];

const PHONE_PREFIXES: [&str; 6] = ["310", "311", "312", "315", "320", "350"];

/// Parameters for building a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub num_riders: usize,
    pub num_drivers: usize,
    pub num_vehicles: usize,
    /// Pending trips to allocate; capped so the exclusivity and rider-cap
    /// rules are satisfiable.
    pub num_trips: usize,
    /// Random seed for reproducibility (optional; if None, uses entropy).
    pub seed: Option<u64>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_riders: 20,
            num_drivers: 10,
            num_vehicles: 10,
            num_trips: 6,
            seed: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_riders(mut self, num_riders: usize) -> Self {
        self.num_riders = num_riders;
        self
    }

    pub fn with_fleet(mut self, num_drivers: usize, num_vehicles: usize) -> Self {
        self.num_drivers = num_drivers;
        self.num_vehicles = num_vehicles;
        self
    }

    pub fn with_trips(mut self, num_trips: usize) -> Self {
        self.num_trips = num_trips;
        self
    }

    /// Load params from a JSON document; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Ids of everything a scenario created.
#[derive(Debug, Clone, Default)]
pub struct ScenarioSummary {
    pub riders: Vec<RiderId>,
    pub drivers: Vec<DriverId>,
    pub vehicles: Vec<VehicleId>,
    pub trips: Vec<TripId>,
}

fn random_phone<R: Rng>(rng: &mut R) -> String {
    let prefix = PHONE_PREFIXES[rng.gen_range(0..PHONE_PREFIXES.len())];
    let mut phone = String::from(prefix);
    for _ in 0..7 {
        phone.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    phone
}

fn random_plate<R: Rng>(rng: &mut R) -> String {
    let mut plate = String::with_capacity(6);
    for _ in 0..3 {
        plate.push(char::from(b'A' + rng.gen_range(0..26u8)));
    }
    for _ in 0..3 {
        plate.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    plate
}

fn random_license<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(4..=6);
    let mut license = String::with_capacity(len);
    for _ in 0..len {
        license.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    license
}

/// In-town hops are cheap, nearby towns mid-range, long hauls the most.
fn banded_price<R: Rng>(rng: &mut R, destination: &str) -> Decimal {
    let price = if destination.starts_with("Vereda") || destination.starts_with("Alto") {
        rng.gen_range(3_000..=8_000)
    } else if NEARBY_TOWNS.contains(&destination) {
        rng.gen_range(10_000..=25_000)
    } else {
        rng.gen_range(30_000..=60_000)
    };
    Decimal::from(price as u32)
}

/// Populate `store` with riders, drivers, vehicles, and pending trips.
///
/// Trips go through the regular allocator, so every generated scenario
/// respects the exclusivity and rider-cap rules by construction.
pub fn build_scenario(
    store: &MemoryStore,
    params: &ScenarioParams,
) -> Result<ScenarioSummary, DispatchError> {
    let mut rng: StdRng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut summary = ScenarioSummary::default();

    for i in 0..params.num_riders {
        let name = RIDER_NAMES[i % RIDER_NAMES.len()];
        let rider = store.add_rider(name, random_phone(&mut rng))?;
        summary.riders.push(rider.id);
    }

    for i in 0..params.num_drivers {
        let name = DRIVER_NAMES[i % DRIVER_NAMES.len()];
        // Some drivers have no license on file; the record is still valid.
        let license = if rng.gen_bool(0.2) {
            None
        } else {
            Some(random_license(&mut rng))
        };
        let driver = store.add_driver(name, license)?;
        summary.drivers.push(driver.id);
    }

    for i in 0..params.num_vehicles {
        let vehicle = loop {
            let plate = random_plate(&mut rng);
            match store.add_vehicle(
                plate.as_str(),
                Some(VEHICLE_MODELS[i % VEHICLE_MODELS.len()].to_string()),
                summary.drivers.get(i).copied(),
            ) {
                Ok(vehicle) => break vehicle,
                // Plate collision: roll again.
                Err(crate::store::StoreError::Conflict(_)) => continue,
                Err(err) => return Err(err.into()),
            }
        };
        summary.vehicles.push(vehicle.id);
    }

    let config = AllocatorConfig::default();
    let clock = SystemClock;
    let max_trips = params
        .num_trips
        .min(summary.drivers.len())
        .min(summary.vehicles.len())
        .min(summary.riders.len() * config.rider_trip_limit);

    for i in 0..max_trips {
        let rider = summary.riders[i % summary.riders.len()];
        let driver = summary.drivers[i];
        let vehicle = summary.vehicles[i];
        let origin = ORIGINS[rng.gen_range(0..ORIGINS.len())];
        let destination = DESTINATIONS[rng.gen_range(0..DESTINATIONS.len())];
        let price = banded_price(&mut rng, destination);

        let request = TripRequest::new(rider, driver, vehicle, origin, destination, price);
        let trip = allocator::allocate(store, &config, &clock, &request)?;
        summary.trips.push(trip.id);
    }

    Ok(summary)
}
