//! Wire forms of Name, ExcludeFilter, PublisherId and Interest

use tracing::{debug, warn};

use super::tags;
use super::{WireDecoder, WireEncodable, WireEncoder};
use crate::domain::exclude::{ExcludeElement, ExcludeFilter};
use crate::domain::interest::{AnswerOriginKind, Interest, OrderPreference};
use crate::domain::name::Name;
use crate::domain::publisher::{PublisherId, PublisherKind, PUBLISHER_ID_LEN};
use crate::error::CodecError;

impl WireEncodable for Name {
    fn encode_to(&self, encoder: &mut WireEncoder) -> Result<(), CodecError> {
        encoder.open(tags::NAME);
        for component in self.components() {
            encoder.leaf(tags::COMPONENT, component);
        }
        encoder.close();
        Ok(())
    }

    fn decode_from(decoder: &mut WireDecoder<'_>) -> Result<Self, CodecError> {
        decoder.open(tags::NAME, "Name")?;
        let mut components = Vec::new();
        while decoder.peek_is(tags::COMPONENT) {
            components.push(decoder.leaf(tags::COMPONENT, "Component")?.to_vec());
        }
        decoder.close("Name close")?;
        Ok(Name::new(components))
    }
}

impl WireEncodable for ExcludeFilter {
    fn encode_to(&self, encoder: &mut WireEncoder) -> Result<(), CodecError> {
        encoder.open(tags::EXCLUDE);
        for element in self.elements() {
            match element {
                ExcludeElement::Component(component) => encoder.leaf(tags::COMPONENT, &component),
                ExcludeElement::Any => encoder.leaf(tags::ANY, &[]),
            }
        }
        encoder.close();
        Ok(())
    }

    fn decode_from(decoder: &mut WireDecoder<'_>) -> Result<Self, CodecError> {
        decoder.open(tags::EXCLUDE, "Exclude")?;
        let mut elements = Vec::new();
        loop {
            match decoder.peek() {
                Some(tags::COMPONENT) => {
                    let component = decoder.leaf(tags::COMPONENT, "Exclude component")?;
                    elements.push(ExcludeElement::Component(component.to_vec()));
                }
                Some(tags::ANY) => {
                    decoder.leaf(tags::ANY, "Exclude range")?;
                    elements.push(ExcludeElement::Any);
                }
                _ => break,
            }
        }
        decoder.close("Exclude close")?;
        Ok(ExcludeFilter::new(elements)?)
    }
}

fn publisher_tag(kind: PublisherKind) -> u8 {
    match kind {
        PublisherKind::Key => tags::PUBLISHER_KEY,
        PublisherKind::Certificate => tags::PUBLISHER_CERTIFICATE,
        PublisherKind::IssuerKey => tags::PUBLISHER_ISSUER_KEY,
        PublisherKind::IssuerCertificate => tags::PUBLISHER_ISSUER_CERTIFICATE,
    }
}

fn publisher_kind(tag: u8) -> Option<PublisherKind> {
    match tag {
        tags::PUBLISHER_KEY => Some(PublisherKind::Key),
        tags::PUBLISHER_CERTIFICATE => Some(PublisherKind::Certificate),
        tags::PUBLISHER_ISSUER_KEY => Some(PublisherKind::IssuerKey),
        tags::PUBLISHER_ISSUER_CERTIFICATE => Some(PublisherKind::IssuerCertificate),
        _ => None,
    }
}

impl WireEncodable for PublisherId {
    fn encode_to(&self, encoder: &mut WireEncoder) -> Result<(), CodecError> {
        encoder.leaf(publisher_tag(self.kind), &self.id);
        Ok(())
    }

    fn decode_from(decoder: &mut WireDecoder<'_>) -> Result<Self, CodecError> {
        let tag = decoder.tag("PublisherID")?;
        let kind = publisher_kind(tag).ok_or(CodecError::UnexpectedTag {
            expected: "PublisherID",
            found: tag,
        })?;
        let payload = decoder.payload("PublisherID")?;
        let id: [u8; PUBLISHER_ID_LEN] =
            payload
                .try_into()
                .map_err(|_| CodecError::InvalidPublisherId {
                    expected: PUBLISHER_ID_LEN,
                    found: payload.len(),
                })?;
        Ok(PublisherId::new(kind, id))
    }
}

impl WireEncodable for Interest {
    fn encode_to(&self, encoder: &mut WireEncoder) -> Result<(), CodecError> {
        self.validate()?;
        encoder.open(tags::INTEREST);
        self.name.encode_to(encoder)?;
        if let Some(count) = self.name_component_count {
            encoder.integer(tags::NAME_COMPONENT_COUNT, count as u64);
        }
        if let Some(additional) = self.additional_name_components {
            encoder.integer(tags::ADDITIONAL_NAME_COMPONENTS, additional as u64);
        }
        if let Some(publisher) = &self.publisher_id {
            publisher.encode_to(encoder)?;
        }
        if let Some(filter) = &self.exclude_filter {
            filter.encode_to(encoder)?;
        }
        if let Some(order) = self.order_preference {
            encoder.integer(tags::ORDER_PREFERENCE, u64::from(order.bits()));
        }
        if let Some(kind) = self.answer_origin_kind {
            encoder.integer(tags::ANSWER_ORIGIN_KIND, u64::from(kind.bits()));
        }
        if let Some(scope) = self.scope {
            encoder.integer(tags::SCOPE, u64::from(scope));
        }
        if let Some(count) = self.count {
            encoder.integer(tags::COUNT, u64::from(count));
        }
        if let Some(nonce) = &self.nonce {
            encoder.leaf(tags::NONCE, nonce);
        }
        if let Some(filter) = &self.response_filter {
            encoder.leaf(tags::RESPONSE_FILTER, filter);
        }
        encoder.close();
        Ok(())
    }

    fn decode_from(decoder: &mut WireDecoder<'_>) -> Result<Self, CodecError> {
        decoder.open(tags::INTEREST, "Interest")?;
        if !decoder.peek_is(tags::NAME) {
            return Err(CodecError::MissingName);
        }
        let mut interest = Interest::new(Name::decode_from(decoder)?);

        if decoder.peek_is(tags::NAME_COMPONENT_COUNT) {
            interest.name_component_count =
                Some(decoder.integer_usize(tags::NAME_COMPONENT_COUNT, "NameComponentCount")?);
        }
        if decoder.peek_is(tags::ADDITIONAL_NAME_COMPONENTS) {
            interest.additional_name_components = Some(
                decoder.integer_usize(tags::ADDITIONAL_NAME_COMPONENTS, "AdditionalNameComponents")?,
            );
        }
        if decoder.peek().and_then(publisher_kind).is_some() {
            interest.publisher_id = Some(PublisherId::decode_from(decoder)?);
        }
        if decoder.peek_is(tags::EXCLUDE) {
            interest.exclude_filter = Some(ExcludeFilter::decode_from(decoder)?);
        }
        if decoder.peek_is(tags::ORDER_PREFERENCE) {
            interest.order_preference = Some(OrderPreference(
                decoder.integer_u32(tags::ORDER_PREFERENCE, "OrderPreference")?,
            ));
        }
        if decoder.peek_is(tags::ANSWER_ORIGIN_KIND) {
            interest.answer_origin_kind = Some(AnswerOriginKind(
                decoder.integer_u32(tags::ANSWER_ORIGIN_KIND, "AnswerOriginKind")?,
            ));
        }
        if decoder.peek_is(tags::SCOPE) {
            interest.scope = Some(decoder.integer_u32(tags::SCOPE, "Scope")?);
        }
        if decoder.peek_is(tags::COUNT) {
            interest.count = Some(decoder.integer_u32(tags::COUNT, "Count")?);
        }
        if decoder.peek_is(tags::NONCE) {
            interest.nonce = Some(decoder.leaf(tags::NONCE, "Nonce")?.to_vec());
        }
        if decoder.peek_is(tags::RESPONSE_FILTER) {
            interest.response_filter =
                Some(decoder.leaf(tags::RESPONSE_FILTER, "ResponseFilter")?.to_vec());
        }

        finish_interest(decoder, &interest);
        Ok(interest)
    }
}

/// Consume the Interest's closing marker, tolerating its absence
///
/// Unknown trailing elements are skipped up to the marker. If they cannot
/// be parsed the rest of the input is dropped.
fn finish_interest(decoder: &mut WireDecoder<'_>, interest: &Interest) {
    loop {
        match decoder.peek() {
            Some(tags::CLOSE) => {
                // Peeked, cannot fail
                let _ = decoder.close("Interest close");
                return;
            }
            None => {
                debug!(interest = %interest, "[InterestCodec] Interest has no closing marker");
                return;
            }
            Some(_) => match decoder.skip_leaf("Interest extension") {
                Ok(tag) => {
                    warn!(interest = %interest, tag, "[InterestCodec] Skipped unknown Interest element")
                }
                Err(e) => {
                    let skipped = decoder.skip_rest();
                    warn!(
                        interest = %interest,
                        error = %e,
                        skipped,
                        "[InterestCodec] Irregular Interest ending, ignoring remainder"
                    );
                    return;
                }
            },
        }
    }
}
