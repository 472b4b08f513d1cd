// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static catalog of offered services.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One offered service and the detail fields collected for it.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogService {
    #[serde(skip)]
    pub name: String,
    pub desc: String,
    pub details: Vec<String>,
}

/// Ordered service catalog. Serialized as `{name: {desc, details}}`.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    services: Vec<CatalogService>,
}

const BUILTIN_SERVICES: &[(&str, &str, &[&str])] = &[
    (
        "Energy Audit",
        "Identify where a building wastes energy (air leaks, poor insulation).",
        &["Building Sq Ft", "Year Built", "Blower Door Test Required?", "Infrared Scan Required?"],
    ),
    (
        "Insulation",
        "R-30 to R-38 recommended for Central Texas. 12-18 inches depth.",
        &["Attic Sq Ft", "Current R-Value", "Target R-Value", "Material (Fiberglass/Cellulose/Spray)"],
    ),
    (
        "Duct Sealing",
        "Leaky ducts can cause 20-30% loss of conditioned air.",
        &["System Age (Years)", "Number of Returns", "Accessible?", "Leakage Test Result (%)"],
    ),
    (
        "Weather stripping",
        "Sealing doors and windows.",
        &["Number of Exterior Doors", "Number of Windows", "Door Material", "Gap Size (inches)"],
    ),
    (
        "LED Light Bulbs",
        "High efficiency lighting upgrades.",
        &["Bulb Count", "Base Type (E26, GU10, etc.)", "Color Temp (3000K, 5000K)"],
    ),
    (
        "Smart Thermostat",
        "Ecobee or Nest installation.",
        &["Brand Preference", "Number of Zones", "C-Wire Present?", "WiFi Signal Strength"],
    ),
    (
        "Solar Attic Fans",
        "Active ventilation for attics.",
        &["Roof Type (Shingle/Tile)", "Roof Pitch", "Number of Units", "Thermostat Setting"],
    ),
    (
        "Radiant Barrier",
        "Reflective barrier to reduce heat gain.",
        &["Attic Sq Ft", "Foil Type", "Installation Method (Staple/Paint)"],
    ),
    (
        "Solatubes",
        "Tubular skylights.",
        &["Tube Diameter (10 or 14 inch)", "Roof Type", "Diffuser Style", "Flashing Type"],
    ),
    (
        "Solar Screens",
        "Exterior window shading.",
        &["Number of Windows", "Screen Color", "Sun Exposure Direction", "Frame Color"],
    ),
    (
        "Electrical Services",
        "General electrical upgrades or panel work.",
        &["Panel Amperage", "Service Overhead/Underground", "Permit Required?", "Number of Circuits"],
    ),
    (
        "Window Installation",
        "Replacement or new windows.",
        &["Count", "Frame Material (Vinyl/Alum)", "Glass Type (Low-E)", "Operation (Single/Double Hung)"],
    ),
    (
        "Door Installation",
        "Front or rear door replacement.",
        &["Count", "Door Type (Entry/Patio)", "Material (Wood/Steel/Fiberglass)", "Jamb Size"],
    ),
    (
        "Water Heater",
        "Traditional or tankless hot water solutions.",
        &["Fuel source (Gas/Electric)", "Type (Tank/Tankless)", "Capacity (Gallons/GPM)", "Location"],
    ),
    (
        "HVAC/Heat Pump",
        "Heating and cooling system.",
        &["Tonnage", "SEER2 Rating", "Furnace Efficiency %", "Existing Ductwork Condition"],
    ),
    (
        "Solar",
        "PV Solar system.",
        &["System Size (kW)", "Panel Count", "Inverter Type (Micro/String)", "Battery Backup Needed?"],
    ),
    (
        "Batteries",
        "Energy storage.",
        &["Capacity (kWh)", "Whole Home vs Critical Load", "Mounting Location"],
    ),
    (
        "Generators",
        "Backup power generation.",
        &["Fuel (Propane/Natural Gas)", "kW Rating", "Transfer Switch Type", "Pad Required?"],
    ),
    (
        "Car chargers",
        "EV charging stations.",
        &["Charger Level (1 or 2)", "Amperage (30-60A)", "Distance to Panel (ft)"],
    ),
];

impl Default for ServiceCatalog {
    /// The built-in contractor catalog.
    fn default() -> Self {
        Self::new(
            BUILTIN_SERVICES
                .iter()
                .map(|(name, desc, details)| CatalogService {
                    name: name.to_string(),
                    desc: desc.to_string(),
                    details: details.iter().map(|d| d.to_string()).collect(),
                })
                .collect(),
        )
    }
}

impl ServiceCatalog {
    /// Build a catalog; later duplicates of a name are dropped.
    pub fn new(services: Vec<CatalogService>) -> Self {
        let mut unique: Vec<CatalogService> = Vec::with_capacity(services.len());
        for service in services {
            if !unique.iter().any(|s| s.name == service.name) {
                unique.push(service);
            }
        }
        Self { services: unique }
    }

    pub fn services(&self) -> &[CatalogService] {
        &self.services
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|s| s.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.iter().any(|s| s.name == name)
    }

    /// Catalog position of `name`; unknown names sort last.
    pub fn rank(&self, name: &str) -> usize {
        self.services
            .iter()
            .position(|s| s.name == name)
            .unwrap_or(usize::MAX)
    }
}

impl Serialize for ServiceCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.services.len()))?;
        for service in &self.services {
            map.serialize_entry(&service.name, service)?;
        }
        map.end()
    }
}
