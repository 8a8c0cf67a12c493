// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::mappers::rules::{is_aor, is_country_iso_code, is_tel_url};
use crate::application::mappers::{envelope_record, envelope_resource, require, ResourceMapper};
use crate::domain::errors::ResourceError;
use crate::domain::kinds::NumberSpec;
use crate::domain::record::{MappingError, StorageRecord};
use crate::domain::resource::{GeoInfo, Kind, Resource};

pub struct NumberMapper;

impl ResourceMapper for NumberMapper {
    const KIND: Kind = Kind::Number;
    type Spec = NumberSpec;

    fn validate_spec(resource: &Resource<Self::Spec>) -> Result<(), ResourceError> {
        let spec = &resource.spec;
        require(
            is_tel_url(&spec.tel_url),
            "telUrl must be a tel: URL, e.g. tel:+17853178070",
        )?;
        require(is_aor(&spec.aor_link), "aorLink must be a sip: or backend: address")?;
        if let Some(geo_info) = &resource.metadata.geo_info {
            require(
                is_country_iso_code(&geo_info.country_iso_code),
                "countryIsoCode must be a two-letter ISO 3166 code",
            )?;
        }
        Ok(())
    }

    fn to_storage(resource: &Resource<Self::Spec>) -> Result<StorageRecord, MappingError> {
        let spec = &resource.spec;
        let mut record = envelope_record(resource);
        record.put("telUrl", spec.tel_url.clone());
        record.put("aorLink", spec.aor_link.clone());
        record.put_ref("gatewayRef", spec.gateway_ref.as_ref());
        record.put_opt("sessionAffinityHeader", spec.session_affinity_header.clone());
        record.put_serialized("extraHeaders", &spec.extra_headers)?;
        if let Some(geo_info) = &resource.metadata.geo_info {
            record.put("city", geo_info.city.clone());
            record.put("country", geo_info.country.clone());
            record.put("countryIsoCode", geo_info.country_iso_code.clone());
        }
        Ok(record)
    }

    fn from_storage(record: &StorageRecord) -> Result<Resource<Self::Spec>, MappingError> {
        let spec = NumberSpec {
            tel_url: record.str("telUrl")?,
            aor_link: record.str("aorLink")?,
            gateway_ref: record.opt_ref("gatewayRef")?,
            session_affinity_header: record.opt_str("sessionAffinityHeader")?,
            extra_headers: record.list("extraHeaders")?,
        };

        let geo_info = match record.opt_str("city")? {
            Some(city) => Some(GeoInfo {
                city,
                country: record.str("country")?,
                country_iso_code: record.str("countryIsoCode")?,
            }),
            None => None,
        };

        let mut resource = envelope_resource(record, spec);
        resource.metadata.geo_info = geo_info;
        Ok(resource)
    }
}
