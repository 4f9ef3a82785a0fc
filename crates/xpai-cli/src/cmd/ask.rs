use crate::output::print_structured;
use crate::session::Session;

pub fn run(
    session: &mut Session,
    text: &[String],
    provider: Option<String>,
    namespace: Option<String>,
) -> anyhow::Result<()> {
    let request = text.join(" ");
    if request.trim().is_empty() {
        return super::interactive::run(session, true, false);
    }

    let filter = session.filter(None, provider, namespace);
    let records = session.records(&filter)?;
    let answer = session.block_on(session.responder().answer(&request, &records));

    if !print_structured(session.output, &answer)? {
        println!("{}", answer.text);
    }
    Ok(())
}
