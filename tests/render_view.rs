use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use askama::Template;
use offstage::{
    Application, Component, ComponentTreeLanguage, DefaultViewHandler, Element, Markup,
    RenderContext, RenderError, RenderSettings, ResponseWriter, TemplateFragment, Text,
    ViewDeclarationLanguage, ViewHandler, ViewRenderer, ViewRoot, capture, encode_all,
    render_view,
};
use offstage::{CaptureBuffer, ContentType, Encoding, HtmlResponseWriter};

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Node that records every encode call it receives.
struct Recorder {
    name: &'static str,
    rendered: bool,
    renders_children: bool,
    own_markup: Option<&'static str>,
    children: Vec<Box<dyn Component>>,
    log: CallLog,
}

impl Recorder {
    fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            rendered: true,
            renders_children: false,
            own_markup: None,
            children: Vec::new(),
            log: log.clone(),
        }
    }

    fn hidden(mut self) -> Self {
        self.rendered = false;
        self
    }

    fn rendering_children(mut self, markup: &'static str) -> Self {
        self.renders_children = true;
        self.own_markup = Some(markup);
        self
    }

    fn child(mut self, child: impl Component + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }
}

impl Component for Recorder {
    fn id(&self) -> Option<&str> {
        Some(self.name)
    }

    fn is_rendered(&self) -> bool {
        self.rendered
    }

    fn children(&self) -> &[Box<dyn Component>] {
        &self.children
    }

    fn renders_children(&self) -> bool {
        self.renders_children
    }

    fn encode_begin(&self, _context: &mut RenderContext) -> Result<(), RenderError> {
        self.log.record(format!("begin:{}", self.name));
        Ok(())
    }

    fn encode_children(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        self.log.record(format!("children:{}", self.name));
        if let Some(markup) = self.own_markup {
            context.response_writer_mut()?.write_raw(markup)?;
        }
        Ok(())
    }

    fn encode_end(&self, _context: &mut RenderContext) -> Result<(), RenderError> {
        self.log.record(format!("end:{}", self.name));
        Ok(())
    }
}

/// Node whose begin phase fails after writing some markup.
struct Failing;

impl Component for Failing {
    fn encode_begin(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        context.response_writer_mut()?.write_raw("<partial>")?;
        Err(RenderError::component("failing", "boom"))
    }
}

struct Panicking;

impl Component for Panicking {
    fn encode_begin(&self, _context: &mut RenderContext) -> Result<(), RenderError> {
        panic!("component exploded");
    }
}

/// Node that renders another view into its own output.
struct Include(&'static str);

impl Component for Include {
    fn encode_begin(&self, context: &mut RenderContext) -> Result<(), RenderError> {
        let inner = render_view(context, self.0).map_err(|err| err.into_cause())?;
        let writer = context.response_writer_mut()?;
        writer.start_element("aside")?;
        writer.write_raw(&inner)?;
        writer.end_element("aside")
    }
}

#[derive(Template)]
#[template(source = "<h1>Hello {{ name }}</h1>", ext = "html")]
struct GreetingTemplate {
    name: String,
}

#[derive(Template)]
#[template(source = "<p>{{ word }}</p>", ext = "html")]
struct WordTemplate {
    word: String,
}

fn context_with(
    settings: RenderSettings,
    register: impl FnOnce(&mut ComponentTreeLanguage),
) -> RenderContext {
    let mut views = ComponentTreeLanguage::new();
    register(&mut views);
    let handler = DefaultViewHandler::new().with_language(".xhtml", Arc::new(views));
    let application = Application::builder()
        .view_handler(Arc::new(handler))
        .settings(settings)
        .build();
    RenderContext::new(Arc::new(application))
}

fn context(register: impl FnOnce(&mut ComponentTreeLanguage)) -> RenderContext {
    context_with(RenderSettings::default(), register)
}

fn live_writer() -> Box<dyn ResponseWriter> {
    Box::new(HtmlResponseWriter::new(
        Box::new(CaptureBuffer::new()),
        ContentType::Html,
        Encoding::Utf8,
    ))
}

fn writer_address(context: &RenderContext) -> Option<*const ()> {
    context
        .response_writer()
        .map(|writer| writer as *const dyn ResponseWriter as *const ())
}

#[test]
fn unrendered_nodes_are_left_out_of_the_fragment() {
    let mut ctx = context(|views| {
        views
            .register("/fragment.xhtml", |_, root| {
                root.push(Text::new("A"));
                root.push(Text::new("B").with_rendered(false));
                Ok(())
            })
            .unwrap();
    });

    assert_eq!(render_view(&mut ctx, "/fragment.xhtml").unwrap(), "A");
}

#[test]
fn self_rendering_child_is_emitted_before_the_following_leaf() {
    let mut ctx = context(|views| {
        views
            .register("/ordered.xhtml", |_, root| {
                root.push(
                    Element::new("div")
                        .rendering_children(true)
                        .child(Element::new("span").child(Text::new("X"))),
                );
                root.push(Text::new("Y"));
                Ok(())
            })
            .unwrap();
    });

    assert_eq!(
        render_view(&mut ctx, "/ordered.xhtml").unwrap(),
        "<div><span>X</span></div>Y"
    );
}

#[test]
fn unrendered_subtrees_receive_no_encode_calls() {
    let log = CallLog::default();
    let recorder_log = log.clone();
    let mut ctx = context(move |views| {
        views
            .register("/hidden.xhtml", move |_, root| {
                root.push(
                    Recorder::new("parent", &recorder_log)
                        .hidden()
                        .child(Recorder::new("child", &recorder_log)),
                );
                Ok(())
            })
            .unwrap();
    });

    assert_eq!(render_view(&mut ctx, "/hidden.xhtml").unwrap(), "");
    assert!(log.entries().is_empty());
}

#[test]
fn self_rendering_nodes_get_one_children_call_and_no_child_visits() {
    let log = CallLog::default();
    let recorder_log = log.clone();
    let mut ctx = context(move |views| {
        views
            .register("/delegating.xhtml", move |_, root| {
                root.push(
                    Recorder::new("table", &recorder_log)
                        .rendering_children("<tr/>")
                        .child(Recorder::new("row-1", &recorder_log))
                        .child(Recorder::new("row-2", &recorder_log)),
                );
                Ok(())
            })
            .unwrap();
    });

    let html = render_view(&mut ctx, "/delegating.xhtml").unwrap();

    assert_eq!(html, "<tr/>");
    assert_eq!(
        log.entries(),
        vec!["begin:table", "children:table", "end:table"]
    );
}

#[test]
fn other_nodes_are_walked_depth_first_in_declared_order() {
    let log = CallLog::default();
    let recorder_log = log.clone();
    let mut ctx = context(move |views| {
        views
            .register("/tree.xhtml", move |_, root| {
                root.push(
                    Recorder::new("a", &recorder_log)
                        .child(Recorder::new("b", &recorder_log).child(Recorder::new("c", &recorder_log)))
                        .child(Recorder::new("d", &recorder_log).hidden())
                        .child(Recorder::new("e", &recorder_log)),
                );
                root.push(Recorder::new("f", &recorder_log));
                Ok(())
            })
            .unwrap();
    });

    render_view(&mut ctx, "/tree.xhtml").unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "begin:a", "begin:b", "begin:c", "end:c", "end:b", "begin:e", "end:e", "end:a",
            "begin:f", "end:f",
        ]
    );
}

#[test]
fn repeated_renders_match_and_restore_the_live_writer() {
    let mut ctx = context(|views| {
        views
            .register("/card.xhtml", |_, root| {
                root.push(
                    Element::new("section")
                        .attribute("class", "card")
                        .child(Text::new("Tom & Jerry")),
                );
                Ok(())
            })
            .unwrap();
    });
    ctx.set_response_writer(Some(live_writer()));
    let live = writer_address(&ctx);

    let first = render_view(&mut ctx, "/card.xhtml").unwrap();
    assert_eq!(writer_address(&ctx), live);
    let second = render_view(&mut ctx, "/card.xhtml").unwrap();
    assert_eq!(writer_address(&ctx), live);

    assert_eq!(first, second);
    assert_eq!(first, "<section class=\"card\">Tom &amp; Jerry</section>");
}

#[test]
fn build_failure_is_reported_and_the_live_writer_restored() {
    let mut ctx = context(|_| {});
    ctx.set_response_writer(Some(live_writer()));
    let live = writer_address(&ctx);

    let err = render_view(&mut ctx, "/missing.xhtml").unwrap_err();

    assert_eq!(err.view_id(), "/missing.xhtml");
    assert!(matches!(
        err.cause(),
        RenderError::ViewNotFound { view_id } if view_id == "/missing.xhtml"
    ));
    assert_eq!(writer_address(&ctx), live);
}

#[test]
fn encode_failure_returns_no_partial_markup() {
    let mut ctx = context(|views| {
        views
            .register("/broken.xhtml", |_, root| {
                root.push(Text::new("before"));
                root.push(Failing);
                Ok(())
            })
            .unwrap();
    });

    let err = render_view(&mut ctx, "/broken.xhtml").unwrap_err();

    assert!(matches!(err.cause(), RenderError::Component { .. }));
    assert!(ctx.response_writer().is_none());
}

#[test]
fn panicking_component_still_restores_the_live_writer() {
    let mut ctx = context(|views| {
        views
            .register("/panics.xhtml", |_, root| {
                root.push(Panicking);
                Ok(())
            })
            .unwrap();
    });
    ctx.set_response_writer(Some(live_writer()));
    let live = writer_address(&ctx);

    let outcome = catch_unwind(AssertUnwindSafe(|| render_view(&mut ctx, "/panics.xhtml")));

    assert!(outcome.is_err());
    assert_eq!(writer_address(&ctx), live);
}

#[test]
fn request_attributes_select_content_type_and_encoding() {
    let mut ctx = context(|views| {
        views
            .register("/mail.xhtml", |_, root| {
                root.push(Text::new("café"));
                root.push(Element::new("br"));
                Ok(())
            })
            .unwrap();
    });
    ctx.request_attributes_mut()
        .insert("facelets.ContentType", "application/xhtml+xml");
    ctx.request_attributes_mut()
        .insert("facelets.Encoding", "US-ASCII");

    assert_eq!(
        render_view(&mut ctx, "/mail.xhtml").unwrap(),
        "caf&#233;<br />"
    );
}

#[test]
fn attribute_names_come_from_settings() {
    let settings = RenderSettings {
        encoding_attribute: "mail.charset".to_string(),
        ..RenderSettings::default()
    };
    let mut ctx = context_with(settings, |views| {
        views
            .register("/price.xhtml", |_, root| {
                root.push(Text::new("€5"));
                Ok(())
            })
            .unwrap();
    });
    ctx.request_attributes_mut()
        .insert("facelets.Encoding", "US-ASCII");
    ctx.request_attributes_mut()
        .insert("mail.charset", "ISO-8859-1");

    assert_eq!(render_view(&mut ctx, "/price.xhtml").unwrap(), "&#8364;5");
}

#[test]
fn unsupported_encoding_attribute_fails_before_the_swap() {
    let mut ctx = context(|views| {
        views
            .register("/x.xhtml", |_, root| {
                root.push(Text::new("x"));
                Ok(())
            })
            .unwrap();
    });
    ctx.set_response_writer(Some(live_writer()));
    let live = writer_address(&ctx);
    ctx.request_attributes_mut()
        .insert("facelets.Encoding", "EBCDIC");

    let err = render_view(&mut ctx, "/x.xhtml").unwrap_err();

    assert!(matches!(
        err.cause(),
        RenderError::UnsupportedEncoding { .. }
    ));
    assert_eq!(writer_address(&ctx), live);
}

#[test]
fn components_can_render_other_views_while_encoding() {
    let mut ctx = context(|views| {
        views
            .register("/inner.xhtml", |_, root| {
                root.push(Element::new("em").child(Text::new("inner")));
                Ok(())
            })
            .unwrap();
        views
            .register("/outer.xhtml", |_, root| {
                root.push(Text::new("start "));
                root.push(Include("/inner.xhtml"));
                root.push(Text::new(" end"));
                Ok(())
            })
            .unwrap();
    });

    assert_eq!(
        render_view(&mut ctx, "/outer.xhtml").unwrap(),
        "start <aside><em>inner</em></aside> end"
    );
}

#[test]
fn askama_templates_render_as_fragments() {
    let mut ctx = context(|views| {
        views
            .register("/greeting.xhtml", |ctx, root| {
                let name = ctx.request_attributes().get("name").unwrap_or("stranger");
                root.push(TemplateFragment::new(GreetingTemplate {
                    name: name.to_string(),
                }));
                Ok(())
            })
            .unwrap();
    });
    ctx.request_attributes_mut().insert("name", "<Ada>");

    let html = render_view(&mut ctx, "/greeting.xhtml").unwrap();
    assert!(html.starts_with("<h1>Hello "), "unexpected markup: {html}");
    assert!(html.ends_with("</h1>"), "unexpected markup: {html}");
    assert!(!html.contains("<Ada>"), "template output must be escaped");
}

#[test]
fn view_renderer_wraps_a_borrowed_context() {
    let mut ctx = context(|views| {
        views
            .register("/note.xhtml", |_, root| {
                root.push(Markup::new("<hr>"));
                Ok(())
            })
            .unwrap();
    });
    let mut renderer = ViewRenderer::new(&mut ctx);
    renderer
        .context()
        .request_attributes_mut()
        .insert("facelets.ContentType", "application/xhtml+xml");

    assert_eq!(renderer.render_view("note.xhtml").unwrap(), "<hr>");

    let rule = Element::new("hr");
    assert_eq!(renderer.render_component(&rule).unwrap(), "<hr />");

    let hidden = Element::new("p").with_rendered(false);
    assert_eq!(renderer.render_component(&hidden).unwrap(), "");

    let visible = Element::new("p").with_id("lead").child(Text::new("hi"));
    assert_eq!(
        renderer.render_component(&visible).unwrap(),
        "<p id=\"lead\">hi</p>"
    );
}

#[test]
fn capture_collects_arbitrary_encoding() {
    let mut ctx = context(|_| {});
    let mut root = ViewRoot::new("/adhoc");
    root.push(Text::new("one"));
    root.push(Text::new("two"));

    let html = capture(&mut ctx, |ctx| offstage::renderer::render_children(ctx, &root)).unwrap();

    assert_eq!(html, "onetwo");
    assert!(ctx.response_writer().is_none());
}

#[test]
fn welcome_email_snapshot() {
    let mut ctx = context(|views| {
        views
            .register("/mail/welcome.xhtml", |_, root| {
                root.push(
                    Element::new("table")
                        .attribute("role", "presentation")
                        .child(
                            Element::new("tr").child(
                                Element::new("td")
                                    .child(Element::new("h2").child(Text::new("Welcome, Ada")))
                                    .child(Element::new("img").attribute("src", "cid:logo"))
                                    .child(
                                        Element::new("p")
                                            .with_rendered(false)
                                            .child(Text::new("internal note")),
                                    )
                                    .child(
                                        Element::new("a")
                                            .attribute("href", "https://example.com/?a=1&b=2")
                                            .child(Text::new("Confirm")),
                                    ),
                            ),
                        ),
                );
                Ok(())
            })
            .unwrap();
    });

    let html = render_view(&mut ctx, "/mail/welcome.xhtml").unwrap();
    insta::assert_snapshot!(html, @r#"<table role="presentation"><tr><td><h2>Welcome, Ada</h2><img src="cid:logo"><a href="https://example.com/?a=1&amp;b=2">Confirm</a></td></tr></table>"#);
}

#[test]
fn captured_output_matches_encoding_into_the_live_writer() {
    let mut ctx = context(|views| {
        views
            .register("/digest.xhtml", |_, root| {
                root.push(
                    Element::new("ul")
                        .attribute("class", "digest")
                        .child(Element::new("li").child(Text::new("a < b")))
                        .child(Element::new("li").with_rendered(false))
                        .child(Element::new("li").child(Markup::new("<b>bold</b>"))),
                );
                root.push(Element::new("br"));
                root.push(Text::new("done"));
                Ok(())
            })
            .unwrap();
    });
    let live = CaptureBuffer::new();
    ctx.set_response_writer(Some(Box::new(HtmlResponseWriter::new(
        Box::new(live.clone()),
        ContentType::Html,
        Encoding::Utf8,
    ))));

    let captured = render_view(&mut ctx, "/digest.xhtml").unwrap();
    assert!(live.is_empty());

    let handler = ctx.view_handler();
    let mut root = handler.create_view(&ctx, "/digest.xhtml").unwrap();
    let language = handler
        .view_declaration_language(&ctx, "/digest.xhtml")
        .unwrap();
    language.build_view(&mut ctx, &mut root).unwrap();
    for child in root.children() {
        encode_all(child.as_ref(), &mut ctx).unwrap();
    }
    ctx.response_writer_mut().unwrap().flush().unwrap();

    assert_eq!(live.contents(), captured);
}

#[test]
fn raw_fragments_follow_the_requested_encoding() {
    let mut ctx = context(|views| {
        views
            .register("/word.xhtml", |_, root| {
                root.push(TemplateFragment::new(WordTemplate {
                    word: "café".to_string(),
                }));
                root.push(Markup::new("€5"));
                Ok(())
            })
            .unwrap();
    });
    ctx.request_attributes_mut()
        .insert("facelets.Encoding", "US-ASCII");

    let html = render_view(&mut ctx, "/word.xhtml").unwrap();

    assert!(html.is_ascii(), "non-ASCII output: {html}");
    assert_eq!(html, "<p>caf&#233;</p>&#8364;5");
}
