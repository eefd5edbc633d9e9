//! Reference landing page markup with every element the controller binds to.
//!
//! Layout (document coordinates, viewport 800px tall):
//!
//! | element                 | top  | height |
//! |-------------------------|------|--------|
//! | `#header`               | 0    | 96     |
//! | `#hero`                 | 0    | 700    |
//! | `#services.fade-up`     | 900  | 400    |
//! | `.fade-left`            | 1400 | 300    |
//! | `.fade-right`           | 1800 | 300    |
//! | `#about` / `.fade-in-up`| 2200 | 600    |
//! | `#contact`              | 3000 | 800    |

use crate::document::{Document, NodeId};

pub const VIEWPORT_HEIGHT: f64 = 800.0;

pub fn landing_page(viewport_width: f64) -> Document {
    let mut doc = Document::new(viewport_width, VIEWPORT_HEIGHT);
    let root = doc.root();
    let body = doc.append_element(root, "body", &[]);

    let header = doc.append_element(body, "header", &[("id", "header")]);
    doc.set_layout(header, 0.0, 96.0);
    let logo_full = doc.append_element(header, "img", &[("id", "logo-full"), ("src", "logo.png")]);
    doc.set_natural_width(logo_full, 240.0);
    let logo_small = doc.append_element(
        header,
        "img",
        &[("id", "logo-small"), ("src", "logo-sm.png")],
    );
    doc.set_natural_width(logo_small, 120.0);
    let logo_inline = doc.append_element(header, "span", &[("id", "logo-inline")]);
    doc.append_text(logo_inline, "LOGO");

    let toggle = doc.append_element(
        header,
        "button",
        &[("id", "mobile-menu"), ("aria-label", "Menu")],
    );
    doc.append_element(toggle, "span", &[("id", "mobile-menu-bar"), ("class", "bar")]);

    let nav = doc.append_element(header, "nav", &[("id", "nav-menu")]);
    let nav_list = doc.append_element(nav, "ul", &[("id", "nav-list")]);
    for (id, href, label) in [
        ("link-services", "#services", "Services"),
        ("link-about", "#about", "About"),
        ("link-contact", "#contact", "Contact"),
    ] {
        nav_link(&mut doc, nav_list, id, href, label);
    }

    let drawer = doc.append_element(
        body,
        "aside",
        &[("id", "mobile-drawer"), ("aria-hidden", "true")],
    );
    doc.append_element(drawer, "ul", &[("id", "drawer-list")]);

    let hero = doc.append_element(body, "section", &[("id", "hero")]);
    doc.set_layout(hero, 0.0, 700.0);
    let top = doc.append_element(hero, "a", &[("id", "link-top"), ("href", "#")]);
    doc.append_text(top, "Top");
    let missing = doc.append_element(hero, "a", &[("id", "link-missing"), ("href", "#pricing")]);
    doc.append_text(missing, "Pricing");

    let services = doc.append_element(body, "section", &[("id", "services"), ("class", "fade-up")]);
    doc.set_layout(services, 900.0, 400.0);
    let left = doc.append_element(body, "div", &[("id", "card-left"), ("class", "card fade-left")]);
    doc.set_layout(left, 1400.0, 300.0);
    let right = doc.append_element(
        body,
        "div",
        &[("id", "card-right"), ("class", "card fade-right")],
    );
    doc.set_layout(right, 1800.0, 300.0);
    let about = doc.append_element(body, "section", &[("id", "about")]);
    doc.set_layout(about, 2200.0, 600.0);
    let about_body = doc.append_element(
        about,
        "div",
        &[("id", "about-body"), ("class", "fade-in-up")],
    );
    doc.set_layout(about_body, 2200.0, 600.0);

    let contact = doc.append_element(body, "section", &[("id", "contact")]);
    doc.set_layout(contact, 3000.0, 800.0);
    let form = doc.append_element(contact, "form", &[("id", "contactForm")]);
    doc.append_element(form, "input", &[("id", "name"), ("type", "text")]);
    doc.append_element(form, "input", &[("id", "email"), ("type", "email")]);
    doc.append_element(form, "input", &[("id", "phone"), ("type", "tel")]);
    let service = doc.append_element(form, "select", &[("id", "service")]);
    for option in ["Plumbing", "Electrical", "Roofing"] {
        let node = doc.append_element(service, "option", &[("value", option)]);
        doc.append_text(node, option);
    }
    doc.append_element(form, "textarea", &[("id", "message")]);
    doc.append_element(form, "button", &[("id", "send"), ("type", "submit")]);
    doc.append_element(contact, "p", &[("id", "formStatus")]);

    doc.append_element(body, "button", &[("id", "backToTop"), ("aria-label", "Back to top")]);
    doc
}

fn nav_link(doc: &mut Document, list: NodeId, id: &str, href: &str, label: &str) {
    let item = doc.append_element(list, "li", &[]);
    let link = doc.append_element(item, "a", &[("id", id), ("href", href), ("class", "nav-link")]);
    doc.append_text(link, label);
}
