use super::parsers::{parse_date, parse_user};
use super::{FieldMapping, MappingTable};

/// Upstream post fields -> internal post fields.
pub const POST_MAPPING: MappingTable = &[
    FieldMapping::direct("id", "id"),
    FieldMapping::direct("text", "text"),
    FieldMapping::direct("entities", "entities"),
    FieldMapping::direct("source", "source"),
    FieldMapping::direct("lang", "lang"),
    FieldMapping::direct("retweeted", "retweeted"),
    FieldMapping::direct("retweet_count", "retweet_count"),
    FieldMapping::direct("favorited", "favorited"),
    FieldMapping::direct("possibly_sensitive", "possibly_sensitive"),
    FieldMapping::direct(
        "possibly_sensitive_appealable",
        "possibly_sensitive_appealable",
    ),
    FieldMapping::direct("is_quote_status", "is_quote_status"),
    FieldMapping::parsed("user", "user", parse_user),
    FieldMapping::parsed("created_at", "created_at", parse_date),
];

/// Upstream user fields -> internal user fields.
pub const USER_MAPPING: MappingTable = &[
    FieldMapping::direct("id", "id"),
    FieldMapping::direct("name", "name"),
    FieldMapping::direct("screen_name", "screen_name"),
    FieldMapping::direct("location", "location"),
    FieldMapping::direct("description", "description"),
    FieldMapping::direct("url", "url"),
    FieldMapping::direct("followers_count", "followers_count"),
    FieldMapping::direct("friends_count", "friends_count"),
    FieldMapping::direct("listed_count", "listed_count"),
    FieldMapping::direct("favourites_count", "favourites_count"),
    FieldMapping::direct("time_zone", "time_zone"),
    FieldMapping::direct("geo_enabled", "geo_enabled"),
    FieldMapping::direct("verified", "verified"),
    FieldMapping::direct("statuses_count", "statuses_count"),
    FieldMapping::direct("lang", "lang"),
    FieldMapping::direct("profile_image_url_https", "profile_image_url_https"),
    FieldMapping::parsed("created_at", "created_at", parse_date),
];
