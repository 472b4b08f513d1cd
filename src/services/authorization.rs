// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email allow-list policy deciding who may obtain a session.

use std::collections::HashSet;

/// Fixed allow-list of exact emails and email domains.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    emails: HashSet<String>,
    domains: HashSet<String>,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl AccessPolicy {
    pub fn new<E, D>(emails: E, domains: D) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| normalize(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
            domains: domains
                .into_iter()
                .map(|d| normalize(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// True if the email is allow-listed exactly or its domain (the part
    /// after the last `@`) is an allowed domain.
    pub fn is_authorized(&self, email: &str) -> bool {
        let email = normalize(email);

        if self.emails.contains(&email) {
            return true;
        }

        let domain = email.rsplit_once('@').map(|(_, d)| d).unwrap_or("");
        !domain.is_empty() && self.domains.contains(domain)
    }
}
