//! Template rendering: clone, relocate slot fragments, interpolate.
//!
//! [`render`] rebuilds a [`RenderTarget`] from scratch on every call:
//!
//! 1. clear the shadow root (placed fragments are parked, not destroyed)
//! 2. clone the template content into it
//! 3. move each [`SlotFragment`] onto its `<slot name="...">` placeholder
//! 4. substitute `{{field}}` placeholders for the configured fields
//!
//! Slot placement is all-or-nothing: every fragment's placeholder is looked
//! up before any fragment moves. If one is missing, none are placed, the
//! rest of the render still happens, and [`WidgetError::SlotNotFound`] is
//! returned.

pub mod interpolate;
pub mod slots;
pub mod target;

pub use interpolate::{placeholder, InterpolationFields};
pub use slots::{SlotFragment, SlotOrigin, SlotSet, SLOT_ATTR};
pub use target::RenderTarget;

use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::error::WidgetError;
use crate::record::Record;
use crate::template::Template;

/// Render `record` through `template` into `target`.
///
/// `slots` is consumed; afterwards every handle is held by `target` until
/// [`RenderTarget::reclaim`] returns it.
pub fn render(
    dom: &mut Dom,
    template: &Template,
    target: &mut RenderTarget,
    slots: SlotSet,
    fields: &InterpolationFields,
    record: &Record,
) -> Result<(), WidgetError> {
    target.clear(dom);
    template.instantiate(dom, target.root());

    let slots: SlotSet = slots
        .into_iter()
        .filter(|fragment| {
            let live = dom.contains(fragment.node());
            if !live {
                tracing::warn!(target_slot = fragment.target(), "dropping stale slot fragment");
            }
            live
        })
        .collect();

    let placement = match plan_placement(dom, target.root(), &slots) {
        Ok(placeholders) => {
            for (fragment, placeholder) in slots.into_iter().zip(placeholders) {
                dom.replace_with(placeholder, fragment.node());
                target.place(fragment);
            }
            Ok(())
        }
        Err(targets) => {
            tracing::error!(
                template = template.id(),
                missing = ?targets,
                "slot fragments have no matching placeholder; none were placed"
            );
            target.park(slots);
            Err(WidgetError::SlotNotFound { targets })
        }
    };

    let root = target.root();
    interpolate::interpolate(dom, root, fields, record, target.pristine_mut());
    placement
}

/// Match each fragment to a distinct placeholder, in order.
///
/// Returns the placeholders, or every target name left without one.
fn plan_placement(dom: &Dom, root: NodeId, slots: &SlotSet) -> Result<Vec<NodeId>, Vec<String>> {
    let mut chosen: Vec<NodeId> = Vec::with_capacity(slots.len());
    let mut missing = Vec::new();
    for fragment in slots.iter() {
        let free = dom
            .find_slots(root, fragment.target())
            .into_iter()
            .find(|candidate| !chosen.contains(candidate));
        match free {
            Some(placeholder) => chosen.push(placeholder),
            None => missing.push(fragment.target().to_owned()),
        }
    }
    if missing.is_empty() {
        Ok(chosen)
    } else {
        Err(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;
    use crate::markup::parse_into;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const LETTER: &str = r#"<header><slot name="header"></slot></header><p>Dear {{last_name}},</p><footer><slot name="footer"></slot></footer>"#;

    struct Fixture {
        dom: Dom,
        host: NodeId,
        target: RenderTarget,
        template: Template,
    }

    fn fixture(template: &str, host_markup: &str) -> Fixture {
        let mut dom = Dom::new();
        let doc = dom.insert(NodeData::Fragment);
        let host = parse_into(&mut dom, doc, host_markup).unwrap()[0];
        let content = dom.insert_child(host, NodeData::element("letter-box-content"));
        let target = RenderTarget::attach(&mut dom, content);
        Fixture {
            dom,
            host,
            target,
            template: Template::parse("letter-box-template", template).unwrap(),
        }
    }

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    impl Fixture {
        fn render(&mut self, slots: SlotSet, fields: &str, rec: &Record) -> Result<(), WidgetError> {
            render(
                &mut self.dom,
                &self.template,
                &mut self.target,
                slots,
                &InterpolationFields::parse(fields),
                rec,
            )
        }

        fn html(&self) -> String {
            self.dom.inner_html(self.target.root())
        }
    }

    #[test]
    fn renders_template_with_slots_and_fields() {
        let mut fx = fixture(
            LETTER,
            r#"<letter-box><h1 slot="header">Hello</h1><em slot="footer">Bye {{last_name}}</em></letter-box>"#,
        );
        let slots = SlotSet::collect(&fx.dom, fx.host);
        let ada = record(json!({"id": 1, "last_name": "Ada"}));
        fx.render(slots, "last_name", &ada).unwrap();

        insta::assert_snapshot!(fx.html(), @r#"<header><h1 slot="header">Hello</h1></header><p>Dear Ada,</p><footer><em slot="footer">Bye Ada</em></footer>"#);
        // Relocated, not copied: the host no longer holds the fragments.
        assert!(SlotSet::collect(&fx.dom, fx.host).is_empty());
        assert_eq!(fx.target.placed_targets(), vec!["header", "footer"]);
    }

    #[test]
    fn fragment_identity_is_preserved() {
        let mut fx = fixture(LETTER, r#"<letter-box><i slot="footer">x</i></letter-box>"#);
        let slots = SlotSet::collect(&fx.dom, fx.host);
        let node = slots.nodes()[0];
        fx.render(slots, "", &record(json!({"id": 1}))).unwrap();
        assert!(fx.dom.is_inclusive_descendant(node, fx.target.root()));
    }

    #[test]
    fn rerender_with_reclaimed_fragments_is_idempotent() {
        let mut fx = fixture(LETTER, r#"<letter-box><em slot="footer">Bye {{last_name}}</em></letter-box>"#);
        let ada = record(json!({"id": 1, "last_name": "Ada"}));

        let slots = SlotSet::collect(&fx.dom, fx.host);
        fx.render(slots, "last_name", &ada).unwrap();
        let first = fx.html();

        let slots = fx.target.reclaim(&mut fx.dom);
        fx.render(slots, "last_name", &ada).unwrap();
        assert_eq!(fx.html(), first);
    }

    #[test]
    fn reclaimed_fragments_carry_authored_content() {
        let mut fx = fixture(LETTER, r#"<letter-box><em slot="footer">Bye {{last_name}}</em></letter-box>"#);
        let slots = SlotSet::collect(&fx.dom, fx.host);
        fx.render(slots, "last_name", &record(json!({"id": 1, "last_name": "Ada"})))
            .unwrap();

        let slots = fx.target.reclaim(&mut fx.dom);
        let node = slots.nodes()[0];
        assert_eq!(fx.dom.parent(node), None);
        assert_eq!(fx.dom.outer_html(node), r#"<em slot="footer">Bye {{last_name}}</em>"#);

        fx.render(slots, "last_name", &record(json!({"id": 2, "last_name": "Grace"})))
            .unwrap();
        assert!(fx.html().contains("<em slot=\"footer\">Bye Grace</em>"));
    }

    #[test]
    fn previous_content_is_dropped() {
        let mut fx = fixture("<p>{{last_name}}</p>", "<letter-box></letter-box>");
        fx.render(SlotSet::new(), "last_name", &record(json!({"id": 1, "last_name": "Ada"})))
            .unwrap();
        fx.render(SlotSet::new(), "last_name", &record(json!({"id": 2, "last_name": "Grace"})))
            .unwrap();
        assert_eq!(fx.html(), "<p>Grace</p>");
    }

    #[test]
    fn clearing_parks_fragments_left_placed() {
        let mut fx = fixture(LETTER, r#"<letter-box><i slot="footer">x</i></letter-box>"#);
        let slots = SlotSet::collect(&fx.dom, fx.host);
        let node = slots.nodes()[0];
        fx.render(slots, "", &record(json!({"id": 1}))).unwrap();
        // Render again without resupplying: the fragment is parked, not destroyed.
        fx.render(SlotSet::new(), "", &record(json!({"id": 1}))).unwrap();
        assert!(fx.dom.contains(node));
        assert!(fx.html().contains(r#"<slot name="footer"></slot>"#));
        assert_eq!(fx.target.held(), 1);
        assert_eq!(fx.target.reclaim(&mut fx.dom).nodes(), vec![node]);
    }

    #[test]
    fn missing_placeholder_places_nothing() {
        let mut fx = fixture(
            r#"<p>{{last_name}}</p><slot name="header"></slot>"#,
            r#"<letter-box><b slot="header">H</b><i slot="footer">F</i></letter-box>"#,
        );
        let slots = SlotSet::collect(&fx.dom, fx.host);
        let err = fx
            .render(slots, "last_name", &record(json!({"id": 1, "last_name": "Ada"})))
            .unwrap_err();

        assert_eq!(
            err,
            WidgetError::SlotNotFound {
                targets: vec!["footer".into()]
            }
        );
        // Nothing moved; interpolation still ran.
        assert_eq!(fx.html(), r#"<p>Ada</p><slot name="header"></slot>"#);
        assert_eq!(SlotSet::collect(&fx.dom, fx.host).len(), 2);
        assert!(fx.target.placed_targets().is_empty());
        assert_eq!(fx.target.held(), 2);
    }

    #[test]
    fn each_fragment_needs_its_own_placeholder() {
        let mut fx = fixture(
            r#"<slot name="x"></slot>"#,
            r#"<letter-box><b slot="x">1</b><i slot="x">2</i></letter-box>"#,
        );
        let slots = SlotSet::collect(&fx.dom, fx.host);
        let err = fx.render(slots, "", &record(json!({"id": 1}))).unwrap_err();
        assert_eq!(err, WidgetError::SlotNotFound { targets: vec!["x".into()] });
    }

    #[test]
    fn stale_fragments_are_dropped() {
        let mut fx = fixture(LETTER, r#"<letter-box><i slot="footer">x</i></letter-box>"#);
        let slots = SlotSet::collect(&fx.dom, fx.host);
        fx.dom.remove(slots.nodes()[0]);
        fx.render(slots, "", &record(json!({"id": 1}))).unwrap();
        assert_eq!(fx.target.held(), 0);
    }

    #[test]
    fn target_reuses_the_shadow_root() {
        let mut fx = fixture("<p></p>", "<letter-box></letter-box>");
        let content = fx.dom.first_by_tag(fx.host, "letter-box-content").unwrap();
        let again = RenderTarget::attach(&mut fx.dom, content);
        assert_eq!(again.root(), fx.target.root());
    }
}
