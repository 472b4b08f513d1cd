// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Project and bid models for storage and API.
//!
//! A project embeds one bid per catalog service. Bids have no identity of
//! their own; they live and die with their parent document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Project status assigned at creation.
pub const DEFAULT_STATUS: &str = "QUOTING";

/// Default state for new site addresses.
pub const DEFAULT_STATE: &str = "TX";

/// Job site address embedded in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SiteAddress {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Default for SiteAddress {
    fn default() -> Self {
        Self {
            address1: String::new(),
            address2: String::new(),
            city: String::new(),
            state: DEFAULT_STATE.to_string(),
            zip: String::new(),
        }
    }
}

/// Free-form per-service attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

/// Bid details in the order the client sent them.
///
/// Keys are unique; a repeated key replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Details(Vec<(String, DetailValue)>);

impl Details {
    pub fn insert(&mut self, key: impl Into<String>, value: DetailValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DetailValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Details {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Details {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DetailsVisitor;

        impl<'de> Visitor<'de> for DetailsVisitor {
            type Value = Details;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of detail name to string, number or boolean")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Details, A::Error> {
                let mut details = Details(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((key, value)) = access.next_entry::<String, DetailValue>()? {
                    details.insert(key, value);
                }
                Ok(details)
            }
        }

        deserializer.deserialize_map(DetailsVisitor)
    }
}

/// Per-service line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BidItem {
    /// Copy of the map key
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub est_cost: f64,
    #[serde(default)]
    #[cfg_attr(
        feature = "binding-generation",
        ts(type = "Record<string, string | number | boolean>")
    )]
    pub details: Details,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub ai_recommendations: String,
}

impl BidItem {
    /// A zero-valued bid for one service.
    pub fn empty(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            selected: false,
            est_cost: 0.0,
            details: Details::default(),
            notes: String::new(),
            ai_recommendations: String::new(),
        }
    }
}

/// Bids keyed by service name, kept in a caller-chosen order.
///
/// Serialized as a JSON object. Keys are unique; the key wins over any
/// `serviceName` stored inside the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bids(Vec<BidItem>);

impl Bids {
    /// One zero-valued bid per service name, in the given order.
    pub fn for_services<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut bids = Bids::default();
        for name in names {
            bids.insert(BidItem::empty(name));
        }
        bids
    }

    /// Insert or replace the bid for `bid.service_name`.
    fn insert(&mut self, bid: BidItem) {
        match self.get_mut(&bid.service_name) {
            Some(existing) => *existing = bid,
            None => self.0.push(bid),
        }
    }

    pub fn get(&self, service_name: &str) -> Option<&BidItem> {
        self.0.iter().find(|b| b.service_name == service_name)
    }

    pub fn get_mut(&mut self, service_name: &str) -> Option<&mut BidItem> {
        self.0.iter_mut().find(|b| b.service_name == service_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BidItem> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|b| b.service_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable sort by a rank; equal ranks keep their relative order.
    pub fn sort_by_rank<F>(&mut self, rank: F)
    where
        F: Fn(&str) -> usize,
    {
        self.0.sort_by_key(|b| rank(&b.service_name));
    }
}

impl Serialize for Bids {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bid in &self.0 {
            map.serialize_entry(&bid.service_name, bid)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Bids {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BidsVisitor;

        impl<'de> Visitor<'de> for BidsVisitor {
            type Value = Bids;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of service name to bid")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Bids, A::Error> {
                let mut bids = Bids(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((name, mut bid)) = access.next_entry::<String, BidItem>()? {
                    bid.service_name = name;
                    bids.insert(bid);
                }
                Ok(bids)
            }
        }

        deserializer.deserialize_map(BidsVisitor)
    }
}

/// Project document stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Project {
    /// Opaque identifier (also used as document ID)
    pub project_id: String,
    /// Owning user
    pub user_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, BidItem>"))]
    pub bids: Bids,
    #[serde(rename = "clientName")]
    pub client_name: String,
    /// Creation day, never changed afterwards
    #[serde(rename = "projectDate")]
    pub project_date: NaiveDate,
    pub status: String,
    #[serde(rename = "siteAddress", default)]
    pub site_address: SiteAddress,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[validate(length(min = 1, max = 200))]
    pub client_name: String,
    pub phone_number: Option<String>,
    pub site_address: Option<SiteAddress>,
}

/// Partial update of project metadata. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[validate(length(min = 1, max = 200))]
    pub client_name: Option<String>,
    pub phone_number: Option<String>,
    pub site_address: Option<SiteAddress>,
    pub status: Option<String>,
}

impl ProjectPatch {
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(client_name) = &self.client_name {
            project.client_name = client_name.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            project.phone_number = phone_number.clone();
        }
        if let Some(site_address) = &self.site_address {
            project.site_address = site_address.clone();
        }
        if let Some(status) = &self.status {
            project.status = status.clone();
        }
    }
}

/// Partial update of one bid. Absent fields are left untouched.
///
/// A `serviceName` in the body is ignored; the path names the bid.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BidPatch {
    pub selected: Option<bool>,
    #[validate(range(min = 0.0))]
    pub est_cost: Option<f64>,
    pub details: Option<Details>,
    pub notes: Option<String>,
    pub ai_recommendations: Option<String>,
}

impl BidPatch {
    pub fn apply_to(&self, bid: &mut BidItem) {
        if let Some(selected) = self.selected {
            bid.selected = selected;
        }
        if let Some(est_cost) = self.est_cost {
            bid.est_cost = est_cost;
        }
        if let Some(details) = &self.details {
            bid.details = details.clone();
        }
        if let Some(notes) = &self.notes {
            bid.notes = notes.clone();
        }
        if let Some(ai_recommendations) = &self.ai_recommendations {
            bid.ai_recommendations = ai_recommendations.clone();
        }
    }
}
