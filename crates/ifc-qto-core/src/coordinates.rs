// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Site coordinates and postal addresses

use ifc_qto_model::{
    AttributeValue, DecodedEntity, EntityResolver, EntityResolverExt, IfcType, Result,
};
use std::sync::Arc;

/// Decode a compound plane angle into decimal degrees
///
/// Components are degrees, minutes, seconds and an optional fraction of a
/// second, all carrying the same sign. Fewer than three components, or any
/// non-numeric component, decode to `None`.
pub fn decode_dms(components: &[AttributeValue]) -> Option<f64> {
    if components.len() < 3 {
        return None;
    }
    let values: Vec<f64> = components
        .iter()
        .take(4)
        .map(|c| c.as_float())
        .collect::<Option<_>>()?;

    let mut decimal = values[0] + values[1] / 60.0 + values[2] / 3600.0;
    if let Some(fraction) = values.get(3) {
        decimal += fraction / (3600.0 * 10000.0);
    }
    Some(decimal)
}

/// Decoded geographic reference of a site
///
/// A `None` component was missing or could not be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SiteCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

/// IfcSite attribute positions
const REF_LATITUDE: usize = 9;
const REF_LONGITUDE: usize = 10;
const REF_ELEVATION: usize = 11;
const SITE_ADDRESS: usize = 13;

/// IfcBuilding BuildingAddress position
const BUILDING_ADDRESS: usize = 11;

impl SiteCoordinates {
    /// Read RefLatitude, RefLongitude and RefElevation from an IfcSite
    pub fn from_site(site: &DecodedEntity) -> Self {
        let angle = |index| site.get_list(index).and_then(decode_dms);
        Self {
            latitude: angle(REF_LATITUDE),
            longitude: angle(REF_LONGITUDE),
            elevation: site.get_float(REF_ELEVATION),
        }
    }
}

/// Coordinates of the first site in the model, `None` when there is no site
pub fn site_coordinates(resolver: &dyn EntityResolver) -> Option<SiteCoordinates> {
    resolver
        .entities_by_type(&IfcType::IfcSite)
        .first()
        .map(|site| SiteCoordinates::from_site(site))
}

/// One-line rendering of an IfcPostalAddress
///
/// Joins the address lines, town and postal code with ", ".
pub fn format_postal_address(address: &DecodedEntity) -> String {
    // AddressLines at 4, Town at 6, PostalCode at 8
    let mut parts: Vec<String> = address
        .get_list(4)
        .unwrap_or_default()
        .iter()
        .filter_map(|line| line.as_string())
        .map(|line| line.trim().to_string())
        .collect();
    for index in [6, 8] {
        if let Some(part) = address.get_string(index) {
            parts.push(part.trim().to_string());
        }
    }
    parts.retain(|p| !p.is_empty());
    parts.join(", ")
}

/// Locate the postal address that best describes the model
///
/// Prefers the building address, then the site address, then any postal
/// address in the model. `Ok(None)` means no address entity exists.
pub fn find_postal_address(resolver: &dyn EntityResolver) -> Result<Option<Arc<DecodedEntity>>> {
    let owners = [
        (IfcType::IfcBuilding, BUILDING_ADDRESS),
        (IfcType::IfcSite, SITE_ADDRESS),
    ];
    for (owner_type, index) in owners {
        for owner in resolver.entities_by_type(&owner_type) {
            if let Some(address) = resolver.follow_ref(&owner, index)? {
                if address.ifc_type == IfcType::IfcPostalAddress {
                    return Ok(Some(address));
                }
            }
        }
    }
    Ok(resolver
        .entities_by_type(&IfcType::IfcPostalAddress)
        .into_iter()
        .next())
}
