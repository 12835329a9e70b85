//! Mail compose deep-links for contacting a poster

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::store::items::{poster_name, LostFoundItem, ThriftItem};

/// Characters escaped the way browsers' `encodeURIComponent` does
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Recipient addresses keep their `@` readable
const ADDRESS_ENCODE_SET: &AsciiSet = &COMPONENT_ENCODE_SET.remove(b'@');

/// Percent-encode one query component
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ENCODE_SET).to_string()
}

/// Build `<endpoint>?to=<email>&subject=<subject>&body=<body>`
pub fn compose_link(endpoint: &str, to: &str, subject: &str, body: &str) -> String {
    format!(
        "{}?to={}&subject={}&body={}",
        endpoint,
        utf8_percent_encode(to, ADDRESS_ENCODE_SET),
        utf8_percent_encode(subject, COMPONENT_ENCODE_SET),
        utf8_percent_encode(body, COMPONENT_ENCODE_SET),
    )
}

pub fn lost_found_link(endpoint: &str, item: &LostFoundItem) -> String {
    let kind = item.item_type.as_str();
    let subject = format!("Found your {} item: {}", kind, item.title);
    let body = format!(
        "Hi {},\n\nI saw your {} item posting for \"{}\" on Find On LU.\n\n{}\n\nLocation: {}\n\nPlease let me know if this is still available.\n\nThanks!",
        poster_name(&item.user_email),
        kind,
        item.title,
        item.description,
        item.location,
    );
    compose_link(endpoint, &item.user_email, &subject, &body)
}

pub fn thrift_link(endpoint: &str, item: &ThriftItem) -> String {
    let subject = format!("Interested in: {}", item.title);
    let body = format!(
        "Hi {},\n\nI'm interested in your item \"{}\" listed for ${}.\n\nIs this still available?\n\nThanks!",
        poster_name(&item.user_email),
        item.title,
        item.price,
    );
    compose_link(endpoint, &item.user_email, &subject, &body)
}
