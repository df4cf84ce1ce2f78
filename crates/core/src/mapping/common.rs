//! Encoders and decoders for the datatypes shared by several record kinds.
//!
//! Encoders append nodes to the scope being built and emit nothing for absent or blank
//! input. Decoders read one scope (the tree root or one group node) and return `None`
//! when nothing under the path holds a usable value. Every child path is formed from the
//! owning group's path, so `contact.telecom` children are `contact.telecom.value` and
//! never collide with the top-level `telecom.value`.

use fhir::{
    display_for_code, Address, CodeableConcept, CodedValue, ContactPoint, HumanName, Identifier,
    Period,
};
use questionnaire::{AnswerNode, ItemScope, LinkId, Reference, TypedValue};

/// Path of `field` inside the group at `group`.
pub(super) fn path(group: &str, field: &str) -> String {
    format!("{group}{}{field}", LinkId::SEPARATOR)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn non_default<T: Default + PartialEq>(value: T) -> Option<T> {
    (value != T::default()).then_some(value)
}

// ============================================================================
// Scalar encoders
// ============================================================================

pub(super) fn push_text(out: &mut Vec<AnswerNode>, link_id: &str, value: Option<&str>) {
    if let Some(text) = present(value) {
        out.push(AnswerNode::string(link_id, text));
    }
}

/// One leaf holding every non-blank value, in order.
pub(super) fn push_texts(out: &mut Vec<AnswerNode>, link_id: &str, values: &[String]) {
    let values: Vec<TypedValue> = values
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| TypedValue::String(s.clone()))
        .collect();

    if !values.is_empty() {
        out.push(AnswerNode::leaf(link_id, values));
    }
}

pub(super) fn push_uri(out: &mut Vec<AnswerNode>, link_id: &str, value: Option<&str>) {
    if let Some(uri) = present(value) {
        out.push(AnswerNode::leaf(link_id, vec![TypedValue::Uri(uri.to_owned())]));
    }
}

pub(super) fn push_date(out: &mut Vec<AnswerNode>, link_id: &str, value: Option<&str>) {
    if let Some(date) = present(value) {
        out.push(AnswerNode::leaf(link_id, vec![TypedValue::Date(date.to_owned())]));
    }
}

pub(super) fn push_date_time(out: &mut Vec<AnswerNode>, link_id: &str, value: Option<&str>) {
    if let Some(moment) = present(value) {
        out.push(AnswerNode::leaf(
            link_id,
            vec![TypedValue::DateTime(moment.to_owned())],
        ));
    }
}

pub(super) fn push_bool(out: &mut Vec<AnswerNode>, link_id: &str, value: Option<bool>) {
    if let Some(flag) = value {
        out.push(AnswerNode::leaf(link_id, vec![TypedValue::Boolean(flag)]));
    }
}

pub(super) fn push_integer(out: &mut Vec<AnswerNode>, link_id: &str, value: Option<i64>) {
    if let Some(number) = value {
        out.push(AnswerNode::leaf(link_id, vec![TypedValue::Integer(number)]));
    }
}

pub(super) fn push_decimal(out: &mut Vec<AnswerNode>, link_id: &str, value: Option<f64>) {
    match value {
        Some(number) if number.is_finite() => {
            out.push(AnswerNode::leaf(link_id, vec![TypedValue::Decimal(number)]));
        }
        Some(number) => tracing::debug!(link_id, %number, "non-finite decimal omitted"),
        None => {}
    }
}

/// A closed value-set member as a fully populated coding.
pub(super) fn push_code<C: CodedValue>(out: &mut Vec<AnswerNode>, link_id: &str, value: Option<C>) {
    if let Some(code) = value {
        out.push(AnswerNode::leaf(
            link_id,
            vec![TypedValue::Coding(questionnaire::Coding::new(
                C::SYSTEM,
                code.code(),
                code.display(),
            ))],
        ));
    }
}

fn reference_value(reference: &fhir::Reference) -> Option<TypedValue> {
    if reference.parts().is_none() {
        tracing::debug!(
            reference = reference.reference.as_deref().unwrap_or("<none>"),
            "malformed reference omitted"
        );
        return None;
    }

    reference.reference.as_ref().map(|r| {
        TypedValue::Reference(Reference {
            reference: r.clone(),
        })
    })
}

pub(super) fn push_reference(
    out: &mut Vec<AnswerNode>,
    link_id: &str,
    value: Option<&fhir::Reference>,
) {
    if let Some(value) = value.and_then(reference_value) {
        out.push(AnswerNode::leaf(link_id, vec![value]));
    }
}

/// One leaf holding every well-formed reference, in order.
pub(super) fn push_references(
    out: &mut Vec<AnswerNode>,
    link_id: &str,
    values: &[fhir::Reference],
) {
    let values: Vec<TypedValue> = values.iter().filter_map(reference_value).collect();
    if !values.is_empty() {
        out.push(AnswerNode::leaf(link_id, values));
    }
}

// ============================================================================
// Composite encoders
// ============================================================================

/// Appends the group built by `encode`, if it has any children.
pub(super) fn push_group<T>(
    out: &mut Vec<AnswerNode>,
    link_id: &str,
    value: Option<&T>,
    encode: fn(&str, &T) -> Vec<AnswerNode>,
) {
    if let Some(value) = value {
        let children = encode(link_id, value);
        if !children.is_empty() {
            out.push(AnswerNode::group(link_id, children));
        }
    }
}

/// Appends one sibling group per repetition, in source order. Repetitions with nothing
/// to encode are dropped.
pub(super) fn push_groups<T>(
    out: &mut Vec<AnswerNode>,
    link_id: &str,
    values: &[T],
    encode: fn(&str, &T) -> Vec<AnswerNode>,
) {
    for value in values {
        push_group(out, link_id, Some(value), encode);
    }
}

pub(super) fn identifier_children(group: &str, identifier: &Identifier) -> Vec<AnswerNode> {
    let mut out = Vec::new();
    push_code(&mut out, &path(group, "use"), identifier.use_type);
    push_uri(&mut out, &path(group, "system"), identifier.system.as_deref());
    push_text(&mut out, &path(group, "value"), identifier.value.as_deref());
    out
}

pub(super) fn name_children(group: &str, name: &HumanName) -> Vec<AnswerNode> {
    let mut out = Vec::new();
    push_code(&mut out, &path(group, "use"), name.use_type);
    push_text(&mut out, &path(group, "family"), name.family.as_deref());
    push_texts(&mut out, &path(group, "given"), &name.given);
    push_texts(&mut out, &path(group, "prefix"), &name.prefix);
    push_texts(&mut out, &path(group, "suffix"), &name.suffix);
    out
}

pub(super) fn telecom_children(group: &str, contact_point: &ContactPoint) -> Vec<AnswerNode> {
    let mut out = Vec::new();
    push_code(&mut out, &path(group, "system"), contact_point.system);
    push_text(&mut out, &path(group, "value"), contact_point.value.as_deref());
    push_code(&mut out, &path(group, "use"), contact_point.use_type);
    push_integer(
        &mut out,
        &path(group, "rank"),
        contact_point.rank.map(i64::from),
    );
    out
}

pub(super) fn address_children(group: &str, address: &Address) -> Vec<AnswerNode> {
    let mut out = Vec::new();
    push_code(&mut out, &path(group, "use"), address.use_type);
    push_code(&mut out, &path(group, "type"), address.address_type);
    push_texts(&mut out, &path(group, "line"), &address.line);
    push_text(&mut out, &path(group, "city"), address.city.as_deref());
    push_text(&mut out, &path(group, "district"), address.district.as_deref());
    push_text(&mut out, &path(group, "state"), address.state.as_deref());
    push_text(
        &mut out,
        &path(group, "postalCode"),
        address.postal_code.as_deref(),
    );
    push_text(&mut out, &path(group, "country"), address.country.as_deref());
    out
}

pub(super) fn period_children(group: &str, period: &Period) -> Vec<AnswerNode> {
    let mut out = Vec::new();
    push_date_time(&mut out, &path(group, "start"), period.start.as_deref());
    push_date_time(&mut out, &path(group, "end"), period.end.as_deref());
    out
}

/// Children of a concept from an open code system.
///
/// Codings without a system take `system`; codings without a display get one derived
/// from the code.
pub(super) fn concept_children(
    group: &str,
    concept: &CodeableConcept,
    system: &str,
) -> Vec<AnswerNode> {
    let codings: Vec<TypedValue> = concept
        .coding
        .iter()
        .filter_map(|coding| {
            let Some(code) = present(coding.code.as_deref()) else {
                tracing::debug!(link_id = group, "coding without code omitted");
                return None;
            };
            Some(TypedValue::Coding(questionnaire::Coding {
                system: Some(present(coding.system.as_deref()).unwrap_or(system).to_owned()),
                code: Some(code.to_owned()),
                display: Some(
                    present(coding.display.as_deref())
                        .map(str::to_owned)
                        .unwrap_or_else(|| display_for_code(code)),
                ),
            }))
        })
        .collect();

    let mut out = Vec::new();
    if !codings.is_empty() {
        out.push(AnswerNode::leaf(path(group, "coding"), codings));
    }
    push_text(&mut out, &path(group, "text"), concept.text.as_deref());
    out
}

// ============================================================================
// Scalar decoders
// ============================================================================

pub(super) fn read_text<S: ItemScope + ?Sized>(scope: &S, link_id: &str) -> Option<String> {
    scope.text_at(link_id)
}

pub(super) fn read_texts<S: ItemScope + ?Sized>(scope: &S, link_id: &str) -> Vec<String> {
    scope.texts_at(link_id)
}

/// The enumeration member named by the first coding's code.
///
/// `code` is authoritative; the coding's system and display are not consulted.
pub(super) fn read_code<C, S>(scope: &S, link_id: &str) -> Option<C>
where
    C: CodedValue,
    S: ItemScope + ?Sized,
{
    let code = scope.coding_at(link_id)?.code()?.trim();
    let value = C::from_code(code);
    if value.is_none() {
        tracing::debug!(link_id, code, "unknown code skipped");
    }
    value
}

pub(super) fn read_bool<S: ItemScope + ?Sized>(scope: &S, link_id: &str) -> Option<bool> {
    scope.bool_at(link_id)
}

pub(super) fn read_integer<S: ItemScope + ?Sized>(scope: &S, link_id: &str) -> Option<i64> {
    scope.integer_at(link_id)
}

pub(super) fn read_decimal<S: ItemScope + ?Sized>(scope: &S, link_id: &str) -> Option<f64> {
    scope.decimal_at(link_id)
}

/// A `Kind/id` reference held by a `valueReference` or `valueString`, as stored.
fn reference_value_at(link_id: &str, value: &TypedValue) -> Option<fhir::Reference> {
    let text = match value {
        TypedValue::Reference(r) => &r.reference,
        TypedValue::String(s) => s,
        other => {
            tracing::debug!(link_id, kind = other.kind_name(), "non-reference value skipped");
            return None;
        }
    };

    let reference = fhir::Reference {
        reference: Some(text.clone()),
        display: None,
    };
    if reference.parts().is_none() {
        tracing::debug!(link_id, reference = %text, "malformed reference skipped");
        return None;
    }
    Some(reference)
}

/// The first well-formed reference held by a leaf.
pub(super) fn read_reference<S: ItemScope + ?Sized>(
    scope: &S,
    link_id: &str,
) -> Option<fhir::Reference> {
    scope
        .values_at(link_id)
        .into_iter()
        .find_map(|value| reference_value_at(link_id, value))
}

pub(super) fn read_references<S: ItemScope + ?Sized>(
    scope: &S,
    link_id: &str,
) -> Vec<fhir::Reference> {
    scope
        .values_at(link_id)
        .into_iter()
        .filter_map(|value| reference_value_at(link_id, value))
        .collect()
}

// ============================================================================
// Composite decoders
// ============================================================================

/// Decodes the first group node at `link_id`.
pub(super) fn read_group<S, T>(
    scope: &S,
    link_id: &str,
    decode: fn(&AnswerNode, &str) -> Option<T>,
) -> Option<T>
where
    S: ItemScope + ?Sized,
{
    read_groups(scope, link_id, decode).into_iter().next()
}

/// Decodes every sibling group at `link_id`, in tree order.
pub(super) fn read_groups<S, T>(
    scope: &S,
    link_id: &str,
    decode: fn(&AnswerNode, &str) -> Option<T>,
) -> Vec<T>
where
    S: ItemScope + ?Sized,
{
    scope
        .resolve(link_id)
        .into_iter()
        .filter(|node| {
            if !node.is_group() {
                tracing::debug!(link_id, "leaf found where a group is expected");
            }
            node.is_group()
        })
        .filter_map(|node| decode(node, link_id))
        .collect()
}

pub(super) fn read_identifier(node: &AnswerNode, group: &str) -> Option<Identifier> {
    non_default(Identifier {
        use_type: read_code(node, &path(group, "use")),
        system: read_text(node, &path(group, "system")),
        value: read_text(node, &path(group, "value")),
    })
}

pub(super) fn read_name(node: &AnswerNode, group: &str) -> Option<HumanName> {
    non_default(HumanName {
        use_type: read_code(node, &path(group, "use")),
        family: read_text(node, &path(group, "family")),
        given: read_texts(node, &path(group, "given")),
        prefix: read_texts(node, &path(group, "prefix")),
        suffix: read_texts(node, &path(group, "suffix")),
    })
}

pub(super) fn read_telecom(node: &AnswerNode, group: &str) -> Option<ContactPoint> {
    let rank_path = path(group, "rank");
    let rank = read_integer(node, &rank_path).and_then(|rank| {
        let converted = u32::try_from(rank).ok();
        if converted.is_none() {
            tracing::debug!(link_id = %rank_path, rank, "rank out of range skipped");
        }
        converted
    });

    non_default(ContactPoint {
        system: read_code(node, &path(group, "system")),
        value: read_text(node, &path(group, "value")),
        use_type: read_code(node, &path(group, "use")),
        rank,
    })
}

pub(super) fn read_address(node: &AnswerNode, group: &str) -> Option<Address> {
    non_default(Address {
        use_type: read_code(node, &path(group, "use")),
        address_type: read_code(node, &path(group, "type")),
        line: read_texts(node, &path(group, "line")),
        city: read_text(node, &path(group, "city")),
        district: read_text(node, &path(group, "district")),
        state: read_text(node, &path(group, "state")),
        postal_code: read_text(node, &path(group, "postalCode")),
        country: read_text(node, &path(group, "country")),
    })
}

pub(super) fn read_period(node: &AnswerNode, group: &str) -> Option<Period> {
    non_default(Period {
        start: read_text(node, &path(group, "start")),
        end: read_text(node, &path(group, "end")),
    })
}

/// Codings are carried through as entered; only the code must be present.
pub(super) fn read_concept(node: &AnswerNode, group: &str) -> Option<CodeableConcept> {
    let coding = node
        .codings_at(&path(group, "coding"))
        .into_iter()
        .filter_map(|coding| {
            let code = coding.code()?;
            Some(fhir::Coding {
                system: present(coding.system.as_deref()).map(str::to_owned),
                code: Some(code.to_owned()),
                display: present(coding.display.as_deref()).map(str::to_owned),
            })
        })
        .collect();

    non_default(CodeableConcept {
        coding,
        text: read_text(node, &path(group, "text")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::{ContactPointSystem, ContactPointUse};
    use questionnaire::QuestionnaireResponse;

    #[test]
    fn child_paths_extend_the_owning_group() {
        assert_eq!(path("telecom", "value"), "telecom.value");
        assert_eq!(path("contact.telecom", "value"), "contact.telecom.value");
    }

    #[test]
    fn blank_scalars_emit_nothing() {
        let mut out = Vec::new();
        push_text(&mut out, "name", Some("   "));
        push_text(&mut out, "name", None);
        push_texts(&mut out, "alias", &["".into(), " ".into()]);
        push_decimal(&mut out, "position.latitude", Some(f64::NAN));
        assert!(out.is_empty());
    }

    #[test]
    fn telecom_groups_do_not_cross_bind() {
        let phone = ContactPoint {
            system: Some(ContactPointSystem::Phone),
            value: Some("0113 243 2799".into()),
            use_type: Some(ContactPointUse::Work),
            rank: Some(1),
        };
        let email = ContactPoint {
            system: Some(ContactPointSystem::Email),
            value: Some("desk@example.org".into()),
            use_type: None,
            rank: None,
        };

        let mut items = Vec::new();
        push_groups(&mut items, "telecom", &[phone.clone(), email.clone()], telecom_children);
        let tree = QuestionnaireResponse::new(items);

        assert_eq!(tree.resolve("telecom").len(), 2);
        assert!(tree.resolve("telecom.value").is_empty());
        assert_eq!(
            read_groups(&tree, "telecom", read_telecom),
            vec![phone, email]
        );
    }

    #[test]
    fn concept_fills_system_and_display() {
        let concept = CodeableConcept {
            coding: vec![fhir::Coding {
                system: None,
                code: Some("doctor".into()),
                display: None,
            }],
            text: None,
        };

        let children = concept_children("code", &concept, fhir::codes::PRACTITIONER_ROLE_SYSTEM);
        let coding = children[0].values()[0].as_coding().expect("coding value");
        assert_eq!(
            coding.system.as_deref(),
            Some(fhir::codes::PRACTITIONER_ROLE_SYSTEM)
        );
        assert_eq!(coding.display.as_deref(), Some("Doctor"));
        assert_eq!(coding.code(), Some("doctor"));
    }

    #[test]
    fn wrong_value_kinds_are_skipped() {
        let node = AnswerNode::group(
            "identifier",
            vec![
                AnswerNode::leaf("identifier.use", vec![TypedValue::String("official".into())]),
                AnswerNode::leaf("identifier.value", vec![TypedValue::Boolean(true)]),
            ],
        );
        assert_eq!(read_identifier(&node, "identifier"), None);
    }

    #[test]
    fn references_accept_string_values() {
        let tree = QuestionnaireResponse::new(vec![AnswerNode::string(
            "partOf",
            "Organization/leeds-trust",
        )]);
        assert_eq!(
            read_reference(&tree, "partOf"),
            Some(fhir::Reference::to("Organization", "leeds-trust"))
        );
    }

    #[test]
    fn malformed_string_references_are_skipped() {
        let tree = QuestionnaireResponse::new(vec![
            AnswerNode::string("organization", "acme"),
            AnswerNode::leaf(
                "location",
                vec![
                    TypedValue::String("not a reference".into()),
                    TypedValue::String("Location/ward-7".into()),
                    TypedValue::Reference(Reference {
                        reference: " Location/clinic-2".into(),
                    }),
                ],
            ),
        ]);

        assert_eq!(read_reference(&tree, "organization"), None);
        assert_eq!(
            read_references(&tree, "location"),
            vec![fhir::Reference::to("Location", "ward-7")]
        );
    }

    #[test]
    fn malformed_references_are_not_emitted() {
        let mut out = Vec::new();
        let malformed = fhir::Reference {
            reference: Some("just-an-id".into()),
            display: None,
        };
        push_reference(&mut out, "partOf", Some(&malformed));
        push_references(&mut out, "location", &[malformed, fhir::Reference::default()]);
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_codes_are_skipped() {
        let tree = QuestionnaireResponse::new(vec![AnswerNode::leaf(
            "gender",
            vec![TypedValue::Coding(questionnaire::Coding::new(
                "http://hl7.org/fhir/administrative-gender",
                "robot",
                "Robot",
            ))],
        )]);
        assert_eq!(read_code::<fhir::AdministrativeGender, _>(&tree, "gender"), None);
    }
}
